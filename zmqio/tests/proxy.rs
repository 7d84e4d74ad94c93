//! Steerable proxy.

use std::time::Duration;
use zmqio::{Proxy, Socket, SocketOptions, SocketState, SocketType};

fn options() -> SocketOptions {
    SocketOptions::default().with_linger(Some(Duration::ZERO))
}

fn socket(kind: SocketType) -> Socket {
    Socket::with_options(kind, options()).unwrap()
}

#[test]
fn test_proxy_forwards_until_terminated() {
    zmqio::run(async {
        let frontend = socket(SocketType::Pull);
        let backend = socket(SocketType::Push);
        frontend.bind("inproc://proxy-front").await.unwrap();
        backend.bind("inproc://proxy-back").await.unwrap();

        let producer = socket(SocketType::Push);
        let consumer = socket(SocketType::Pull);
        producer.connect("inproc://proxy-front").unwrap();
        consumer.connect("inproc://proxy-back").unwrap();

        let proxy = Proxy::new(frontend, backend).unwrap();
        let run = proxy.run();
        assert!(proxy.is_running());
        assert_eq!(proxy.frontend().state(), SocketState::Blocked);
        assert!(proxy.frontend().receive().await.unwrap_err().is_busy());

        producer.send(["job", "1"]).await.unwrap();
        let job = consumer.receive().await.unwrap();
        assert_eq!(job[0], "job");
        assert_eq!(job[1], "1");

        proxy.pause().unwrap();
        proxy.resume().unwrap();
        proxy.terminate().unwrap();
        run.await.unwrap();

        assert!(!proxy.is_running());
        assert!(proxy.frontend().is_closed());
        assert!(proxy.backend().is_closed());
        assert!(proxy.terminate().unwrap_err().is_closed());
    })
    .unwrap();
}

#[test]
fn test_proxy_requires_endpoints() {
    zmqio::run(async {
        let frontend = socket(SocketType::Router);
        let backend = socket(SocketType::Dealer);
        frontend.bind("inproc://proxy-unbound-front").await.unwrap();

        let proxy = Proxy::new(frontend, backend).unwrap();
        let err = proxy.run().await.unwrap_err();
        assert!(matches!(err, zmqio::Error::Argument(_)));
        assert_eq!(err.to_string(), "Back-end socket must be bound or connected");
        assert_eq!(proxy.frontend().state(), SocketState::Open);
        assert!(proxy.pause().unwrap_err().is_closed());
    })
    .unwrap();
}

#[test]
fn test_dropping_running_proxy_terminates_it() {
    zmqio::run(async {
        let frontend = socket(SocketType::Router);
        let backend = socket(SocketType::Dealer);
        frontend.bind("inproc://proxy-drop-front").await.unwrap();
        backend.bind("inproc://proxy-drop-back").await.unwrap();

        let proxy = Proxy::new(frontend, backend).unwrap();
        let run = proxy.run();
        drop(proxy);
        run.await.unwrap();
    })
    .unwrap();
}
