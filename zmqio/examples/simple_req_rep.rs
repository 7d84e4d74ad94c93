//! Request/reply over TCP on one thread.
//!
//! Run with:
//! ```bash
//! RUST_LOG=zmqio=debug cargo run --example simple_req_rep
//! ```

use zmqio::{Socket, SocketType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    zmqio::dev_tracing::init_tracing();

    zmqio::run(async {
        let server = Socket::new(SocketType::Rep)?;
        let client = Socket::new(SocketType::Req)?;
        server.bind("tcp://127.0.0.1:*").await?;
        let endpoint = server.last_endpoint()?.unwrap_or_default();
        client.connect(&endpoint)?;
        println!("server bound to {endpoint}");

        let serve = async {
            for _ in 0..3 {
                let request = server.receive().await?;
                let text = String::from_utf8_lossy(&request[0]).to_uppercase();
                server.send(text).await?;
            }
            Ok::<_, zmqio::Error>(())
        };

        let ask = async {
            for word in ["alpha", "beta", "gamma"] {
                client.send(word).await?;
                let reply = client.receive().await?;
                println!("{word} -> {}", String::from_utf8_lossy(&reply[0]));
            }
            Ok::<_, zmqio::Error>(())
        };

        let (served, asked) = futures::future::join(serve, ask).await;
        served?;
        asked?;
        server.set_linger(0)?;
        client.set_linger(0)?;
        Ok::<_, zmqio::Error>(())
    })??;
    Ok(())
}
