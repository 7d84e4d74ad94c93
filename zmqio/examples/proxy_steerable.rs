//! A PULL/PUSH forwarder steered from the owning thread.
//!
//! Run with:
//! ```bash
//! cargo run --example proxy_steerable
//! ```

use std::time::Duration;
use zmqio::{Proxy, Socket, SocketOptions, SocketType};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    zmqio::dev_tracing::init_tracing();

    zmqio::run(async {
        let options = SocketOptions::default().with_linger(Some(Duration::ZERO));
        let open = |kind| Socket::with_options(kind, options.clone());

        let frontend = open(SocketType::Pull)?;
        let backend = open(SocketType::Push)?;
        frontend.bind("inproc://jobs").await?;
        backend.bind("inproc://workers").await?;

        let producer = open(SocketType::Push)?;
        let worker = open(SocketType::Pull)?;
        producer.connect("inproc://jobs")?;
        worker.connect("inproc://workers")?;

        let proxy = Proxy::new(frontend, backend)?;
        let running = proxy.run();

        for job in 0..5_u32 {
            producer.send(job.to_string()).await?;
            let received = worker.receive().await?;
            println!("worker got job {}", String::from_utf8_lossy(&received[0]));
            if job == 2 {
                proxy.pause()?;
                println!("paused");
                proxy.resume()?;
                println!("resumed");
            }
        }

        proxy.terminate()?;
        running.await?;
        println!("proxy stopped; frontend closed: {}", proxy.frontend().is_closed());
        Ok::<_, zmqio::Error>(())
    })??;
    Ok(())
}
