//! Shared and private contexts.

use std::time::Duration;
use zmqio::{Context, ContextOptions, Errno, Socket, SocketOptions, SocketType};

#[test]
fn test_shared_context_is_reused() {
    zmqio::run(async {
        let first = Context::shared().unwrap();
        let second = Context::shared().unwrap();
        assert!(first.is_shared());
        assert!(second.is_shared());
        assert!(first.io_threads().unwrap() >= 1);

        // Sockets on the shared context reach each other over inproc.
        let a = Socket::new(SocketType::Pair).unwrap();
        let b = Socket::with_context(SocketType::Pair, &first).unwrap();
        a.bind("inproc://context-shared").await.unwrap();
        b.connect("inproc://context-shared").unwrap();
        a.send("hello").await.unwrap();
        assert_eq!(b.receive().await.unwrap()[0], "hello");
        a.set_linger(0).unwrap();
        b.set_linger(0).unwrap();
    })
    .unwrap();
}

#[test]
fn test_private_context_round_trip() {
    zmqio::run(async {
        let context = Context::with_options(ContextOptions::new().with_blocky(false)).unwrap();
        let options = SocketOptions::default().with_linger(Some(Duration::ZERO));
        let sender = Socket::with_context_and_options(SocketType::Push, &context, options.clone()).unwrap();
        let receiver = Socket::with_context_and_options(SocketType::Pull, &context, options).unwrap();

        receiver.bind("inproc://context-round-trip").await.unwrap();
        sender.connect("inproc://context-round-trip").unwrap();
        sender.send("hello").await.unwrap();

        let received = receiver.receive().await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], "hello");

        sender.close();
        receiver.close();
        context.close();
    })
    .unwrap();
}

#[test]
fn test_private_context_options() {
    zmqio::run(async {
        let options = ContextOptions::new()
            .with_io_threads(2)
            .with_max_sockets(64)
            .with_blocky(false);
        let context = Context::with_options(options).unwrap();
        assert!(!context.is_shared());
        assert_eq!(context.io_threads().unwrap(), 2);
        assert_eq!(context.max_sockets().unwrap(), 64);
        assert!(!context.blocky().unwrap());

        context.set_ipv6(true).unwrap();
        assert!(context.ipv6().unwrap());
        assert!(context.socket_limit().unwrap() > 0);

        let err = context.get_option(-1).unwrap_err();
        assert!(matches!(err, zmqio::Error::Argument(_)));
    })
    .unwrap();
}

#[test]
fn test_closed_context_rejects_sockets() {
    zmqio::run(async {
        let context = Context::new().unwrap();
        context.close();
        context.close();
        assert!(context.is_closed());

        let err = Socket::with_context(SocketType::Dealer, &context).unwrap_err();
        assert_eq!(err.errno(), Some(Errno::EFAULT));
        assert_eq!(err.to_string(), "Context is closed");
        assert_eq!(context.io_threads().unwrap_err().errno(), Some(Errno::EFAULT));
    })
    .unwrap();
}

#[test]
fn test_private_context_sockets_stay_private() {
    zmqio::run(async {
        let context = Context::with_options(ContextOptions::new().with_blocky(false)).unwrap();
        let options = SocketOptions::default()
            .with_linger(Some(Duration::ZERO))
            .with_send_timeout(Duration::ZERO);
        let private = Socket::with_context_and_options(SocketType::Push, &context, options).unwrap();
        let shared = Socket::new(SocketType::Pull).unwrap();
        shared.set_linger(0).unwrap();
        shared.bind("inproc://context-private").await.unwrap();

        // inproc endpoints do not cross contexts.
        private.connect("inproc://context-private").unwrap();
        let _ = private.send("lost").await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        shared.set_receive_timeout(0).unwrap();
        assert!(shared.receive().await.unwrap_err().is_again());
    })
    .unwrap();
}

#[test]
fn test_closing_context_fails_socket_operations() {
    zmqio::run(async {
        let context = Context::with_options(ContextOptions::new().with_blocky(false)).unwrap();
        let socket = Socket::with_context(SocketType::Pull, &context).unwrap();
        socket.set_linger(0).unwrap();
        socket.bind("inproc://context-shutdown").await.unwrap();

        let pending = socket.receive();
        context.close();
        assert_eq!(pending.await.unwrap_err().errno(), Some(Errno::ETERM));
        assert_eq!(socket.receive().await.unwrap_err().errno(), Some(Errno::ETERM));

        // Still open until closed explicitly.
        assert!(!socket.is_closed());
        socket.close();
    })
    .unwrap();
}
