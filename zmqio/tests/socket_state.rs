//! Socket lifecycle: open, blocked by bind/unbind, closed, and the busy
//! rules for outstanding operations.

use std::time::{Duration, Instant};
use zmqio::{id, Errno, Socket, SocketOptions, SocketState, SocketType};

fn options() -> SocketOptions {
    SocketOptions::default().with_linger(Some(Duration::ZERO))
}

fn unique(name: &str) -> String {
    use std::sync::atomic::{AtomicUsize, Ordering};
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    format!("inproc://state-{name}-{}", NEXT.fetch_add(1, Ordering::Relaxed))
}

#[test]
fn test_close_is_idempotent_and_final() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Pair, options()).unwrap();
        assert_eq!(socket.state(), SocketState::Open);

        socket.close();
        socket.close();
        assert!(socket.is_closed());
        assert_eq!(socket.endpoints(), 0);

        let err = socket.send("late").await.unwrap_err();
        assert!(err.is_closed());
        assert_eq!(err.errno(), Some(Errno::EBADF));
        assert!(socket.receive().await.unwrap_err().is_closed());
        assert!(socket.connect("inproc://nowhere").unwrap_err().is_closed());
        assert!(socket.linger().unwrap_err().is_closed());
    })
    .unwrap();
}

#[test]
fn test_endpoint_operations_fail_after_close() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Dealer, options()).unwrap();
        let bound = unique("closed-bound");
        let peer = unique("closed-peer");
        socket.bind(&bound).await.unwrap();
        socket.connect(&peer).unwrap();
        assert_eq!(socket.endpoints(), 2);

        socket.close();
        assert_eq!(socket.endpoints(), 0);
        assert!(socket.bind(&unique("closed-late")).await.unwrap_err().is_closed());
        assert!(socket.unbind(&bound).await.unwrap_err().is_closed());
        assert!(socket.bind_sync(&unique("closed-sync")).unwrap_err().is_closed());
        assert!(socket.unbind_sync(&bound).unwrap_err().is_closed());
        assert!(socket.disconnect(&peer).unwrap_err().is_closed());
        assert!(socket.set_linger(0).unwrap_err().is_closed());
        assert!(socket.set_option(id::SNDHWM, 10_i32).unwrap_err().is_closed());
        assert!(socket.get_option::<i32>(id::SNDHWM).unwrap_err().is_closed());
    })
    .unwrap();
}

#[test]
fn test_second_receive_is_busy_and_close_settles_first() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Pull, options()).unwrap();
        socket.bind(&unique("busy-read")).await.unwrap();

        let first = socket.receive();
        assert!(!first.is_ready());
        assert!(socket.is_reading());

        let err = socket.receive().await.unwrap_err();
        assert!(err.is_busy());
        assert_eq!(
            err.to_string(),
            "Socket is busy reading; only one receive operation may be in progress at any time"
        );

        socket.close();
        let err = first.await.unwrap_err();
        assert!(err.is_again());
        assert!(!socket.is_reading());
    })
    .unwrap();
}

#[test]
fn test_second_send_is_busy() {
    zmqio::run(async {
        // No peer: sends wait for one.
        let socket = Socket::with_options(SocketType::Push, options()).unwrap();
        socket.bind(&unique("busy-write")).await.unwrap();

        let first = socket.send("one");
        assert!(socket.is_writing());
        let err = socket.send("two").await.unwrap_err();
        assert!(err.is_busy());
        assert_eq!(err.errno(), Some(Errno::EBUSY));

        drop(socket);
        assert!(first.await.unwrap_err().is_again());
    })
    .unwrap();
}

#[test]
fn test_bind_blocks_socket_until_complete() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Pull, options()).unwrap();
        let bind = socket.bind(&unique("blocked"));
        assert_eq!(socket.state(), SocketState::Blocked);

        let err = socket.receive().await.unwrap_err();
        assert!(err.is_busy());
        assert_eq!(err.to_string(), "Socket is blocked by a bind or unbind operation");
        assert!(socket.bind("inproc://other").await.unwrap_err().is_busy());
        assert!(socket.set_linger(0).unwrap_err().is_busy());

        bind.await.unwrap();
        assert_eq!(socket.state(), SocketState::Open);
        assert_eq!(socket.endpoints(), 1);
    })
    .unwrap();
}

#[test]
fn test_close_while_blocked_is_deferred() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Pull, options()).unwrap();
        let bind = socket.bind(&unique("deferred-close"));
        socket.close();
        assert_eq!(socket.state(), SocketState::Blocked);

        bind.await.unwrap();
        assert!(socket.is_closed());
        assert_eq!(socket.endpoints(), 0);
    })
    .unwrap();
}

#[test]
fn test_bind_failure_carries_address() {
    zmqio::run(async {
        let first = Socket::with_options(SocketType::Pull, options()).unwrap();
        let second = Socket::with_options(SocketType::Pull, options()).unwrap();
        let address = unique("in-use");
        first.bind(&address).await.unwrap();

        let err = second.bind(&address).await.unwrap_err();
        assert_eq!(err.errno(), Some(Errno::EADDRINUSE));
        assert_eq!(err.address(), Some(address.as_str()));
        assert_eq!(second.endpoints(), 0);
        assert_eq!(second.state(), SocketState::Open);
    })
    .unwrap();
}

#[test]
fn test_endpoint_counting() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Dealer, options()).unwrap();
        let bound = unique("count-bind");
        let connected = unique("count-connect");

        socket.bind(&bound).await.unwrap();
        socket.connect(&connected).unwrap();
        assert_eq!(socket.endpoints(), 2);

        socket.disconnect(&connected).unwrap();
        socket.unbind(&bound).await.unwrap();
        assert_eq!(socket.endpoints(), 0);

        assert!(socket.unbind(&bound).await.is_err());
        assert_eq!(socket.endpoints(), 0);

        socket.bind_sync(&bound).unwrap();
        assert_eq!(socket.endpoints(), 1);
        socket.unbind_sync(&bound).unwrap();
        assert_eq!(socket.endpoints(), 0);
    })
    .unwrap();
}

#[test]
fn test_zero_send_timeout_fails_immediately() {
    zmqio::run(async {
        let options = options().with_send_timeout(Duration::ZERO);
        let socket = Socket::with_options(SocketType::Push, options).unwrap();
        let reply = socket.send("nobody listens");
        assert!(reply.is_ready());
        assert!(reply.await.unwrap_err().is_again());
        assert!(!socket.is_writing());
    })
    .unwrap();
}

#[test]
fn test_receive_timeout_expires() {
    zmqio::run(async {
        let options = options().with_recv_timeout(Duration::from_millis(50));
        let socket = Socket::with_options(SocketType::Pull, options).unwrap();
        socket.bind(&unique("timeout")).await.unwrap();

        let started = Instant::now();
        let err = socket.receive().await.unwrap_err();
        assert!(err.is_again());
        assert!(started.elapsed() >= Duration::from_millis(40));

        // A fresh receive may start once the first settled.
        socket.set_receive_timeout(0).unwrap();
        assert!(socket.receive().await.unwrap_err().is_again());
    })
    .unwrap();
}

#[test]
fn test_options_round_trip() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Dealer, options()).unwrap();
        assert_eq!(socket.linger().unwrap(), 0);

        socket.set_send_timeout(100).unwrap();
        assert_eq!(socket.send_timeout().unwrap(), 100);
        socket.set_receive_high_water_mark(10).unwrap();
        assert_eq!(socket.receive_high_water_mark().unwrap(), 10);
        socket.set_routing_id(b"peer-1").unwrap();
        assert_eq!(socket.routing_id().unwrap(), b"peer-1");
        assert_eq!(socket.raw_type().unwrap(), SocketType::Dealer.raw());
        assert_eq!(socket.last_endpoint().unwrap(), None);

        let address = unique("last");
        socket.bind(&address).await.unwrap();
        assert_eq!(socket.last_endpoint().unwrap(), Some(address));
    })
    .unwrap();
}

#[test]
fn test_option_argument_errors() {
    zmqio::run(async {
        let socket = Socket::with_options(SocketType::Dealer, options()).unwrap();

        let err = socket.set_option(id::LINGER, true).unwrap_err();
        assert!(matches!(err, zmqio::Error::Argument(_)));
        assert!(socket.get_option::<i32>(-1).is_err());
        assert!(socket.get_option::<i64>(id::SNDHWM).is_err());

        let err = socket
            .connect_with_routing_id("inproc://routed", &b"id"[..])
            .unwrap_err();
        assert!(matches!(err, zmqio::Error::Argument(_)));
    })
    .unwrap();
}

#[test]
fn test_options_applied_at_creation() {
    zmqio::run(async {
        let options = options()
            .with_send_hwm(7)
            .with_recv_timeout(Duration::from_millis(250))
            .with_option(id::TCP_KEEPALIVE, 1_i32);
        let socket = Socket::with_options(SocketType::Dealer, options).unwrap();
        assert_eq!(socket.send_high_water_mark().unwrap(), 7);
        assert_eq!(socket.receive_timeout().unwrap(), 250);
        assert_eq!(socket.tcp_keepalive().unwrap(), 1);

        let bad = SocketOptions::default().with_option(id::LINGER, "forever");
        assert!(Socket::with_options(SocketType::Dealer, bad).is_err());
    })
    .unwrap();
}

#[test]
fn test_router_connect_with_routing_id() {
    zmqio::run(async {
        let router = Socket::with_options(SocketType::Router, options()).unwrap();
        let address = unique("router-id");
        let server = Socket::with_options(SocketType::Router, options()).unwrap();
        server.bind(&address).await.unwrap();

        router.connect_with_routing_id(&address, &b"server"[..]).unwrap();
        assert_eq!(router.endpoints(), 1);
    })
    .unwrap();
}
