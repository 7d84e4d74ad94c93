//! Prints the lifecycle events of a socket.
//!
//! Run with:
//! ```bash
//! cargo run --example socket_monitoring
//! ```

use futures::StreamExt;
use std::time::Duration;
use zmqio::{Observer, Socket, SocketOptions, SocketType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    zmqio::run(async {
        let options = SocketOptions::default().with_linger(Some(Duration::ZERO));
        let server = Socket::with_options(SocketType::Router, options.clone())?;
        let observer = Observer::new(&server)?;

        server.bind("tcp://127.0.0.1:*").await?;
        let endpoint = server.last_endpoint()?.unwrap_or_default();

        let client = Socket::with_options(SocketType::Dealer, options)?;
        client.connect(&endpoint)?;
        client.send("hello").await?;
        let request = server.receive().await?;
        println!("router got {} parts", request.len());

        client.close();
        tokio::time::sleep(Duration::from_millis(50)).await;
        server.close();

        let mut events = observer.events();
        while let Some(event) = events.next().await {
            println!("{}", event?);
        }
        Ok::<_, zmqio::Error>(())
    })??;
    Ok(())
}
