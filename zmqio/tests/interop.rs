//! zmqio sockets talking to plain libzmq sockets driven by the `zmq` crate
//! on a separate thread.

use std::thread;
use std::time::Duration;
use zmqio::{Bytes, Socket, SocketOptions, SocketType};

fn options() -> SocketOptions {
    SocketOptions::default().with_linger(Some(Duration::ZERO))
}

fn tcp_endpoint() -> String {
    let port = portpicker::pick_unused_port().expect("no free port");
    format!("tcp://127.0.0.1:{port}")
}

fn peer(kind: zmq::SocketType) -> zmq::Socket {
    let ctx = zmq::Context::new();
    let socket = ctx.socket(kind).unwrap();
    socket.set_linger(1_000).unwrap();
    socket.set_rcvtimeo(5_000).unwrap();
    socket.set_sndtimeo(5_000).unwrap();
    socket
}

#[test]
fn test_interop_pull_from_libzmq_push() {
    zmqio::dev_tracing::init_tracing();
    let endpoint = tcp_endpoint();

    let result = zmqio::run({
        let endpoint = endpoint.clone();
        async move {
            let pull = Socket::with_options(SocketType::Pull, options())?;
            pull.bind(&endpoint).await?;

            let pusher = thread::spawn(move || {
                let push = peer(zmq::PUSH);
                push.connect(&endpoint).unwrap();
                push.send_multipart(["Hello", "World"], 0).unwrap();
            });

            let msg = pull.receive().await?;
            pusher.join().unwrap();
            Ok::<_, zmqio::Error>(msg.into_parts())
        }
    })
    .unwrap()
    .unwrap();

    assert_eq!(result, vec![Bytes::from("Hello"), Bytes::from("World")]);
}

#[test]
fn test_interop_router_replies_to_dealer_identity() {
    let endpoint = tcp_endpoint();

    let reply = zmqio::run({
        let endpoint = endpoint.clone();
        async move {
            let router = Socket::with_options(SocketType::Router, options())?;
            router.bind(&endpoint).await?;

            let client = thread::spawn(move || {
                let dealer = peer(zmq::DEALER);
                dealer.set_identity(b"CLIENT_A").unwrap();
                dealer.connect(&endpoint).unwrap();
                dealer.send("Hello", 0).unwrap();
                dealer.recv_string(0).unwrap().unwrap()
            });

            let msg = router.receive().await?;
            assert_eq!(&msg[0][..], b"CLIENT_A");
            assert_eq!(&msg[1][..], b"Hello");
            router.send([msg[0].clone(), Bytes::from_static(b"World")]).await?;

            Ok::<_, zmqio::Error>(client.join().unwrap())
        }
    })
    .unwrap()
    .unwrap();

    assert_eq!(reply, "World");
}

#[test]
fn test_interop_rep_serves_libzmq_req() {
    let endpoint = tcp_endpoint();

    zmqio::run({
        let endpoint = endpoint.clone();
        async move {
            let rep = Socket::with_options(SocketType::Rep, options())?;
            rep.bind(&endpoint).await?;

            let client = thread::spawn(move || {
                let req = peer(zmq::REQ);
                req.connect(&endpoint).unwrap();
                (0..3)
                    .map(|i| {
                        req.send(format!("ping {i}").as_str(), 0).unwrap();
                        req.recv_string(0).unwrap().unwrap()
                    })
                    .collect::<Vec<_>>()
            });

            for _ in 0..3 {
                let request = rep.receive().await?;
                let text = std::str::from_utf8(&request[0]).unwrap().replace("ping", "pong");
                rep.send(text).await?;
            }

            let replies = client.join().unwrap();
            assert_eq!(replies, vec!["pong 0", "pong 1", "pong 2"]);
            Ok::<_, zmqio::Error>(())
        }
    })
    .unwrap()
    .unwrap();
}

#[test]
fn test_interop_large_payload_reaches_libzmq_intact() {
    let endpoint = tcp_endpoint();
    let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    let puller = {
        let endpoint = endpoint.clone();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let handle = thread::spawn(move || {
            let pull = peer(zmq::PULL);
            pull.bind(&endpoint).unwrap();
            ready_tx.send(()).unwrap();
            pull.recv_multipart(0).unwrap()
        });
        ready_rx.recv().unwrap();
        handle
    };

    zmqio::run(async move {
        // Default linger: the payload must be flushed before teardown.
        let push = Socket::new(SocketType::Push)?;
        push.connect(&endpoint)?;
        push.send([Bytes::from(payload), Bytes::from_static(b"tail")]).await?;
        Ok::<_, zmqio::Error>(())
    })
    .unwrap()
    .unwrap();

    let parts = puller.join().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0], expected);
    assert_eq!(parts[1], b"tail");
}
