//! Draft socket types: routing ids and groups.
//!
//! Requires a libzmq built with the draft API.

use std::time::Duration;
use zmqio::{Addressable, Grouped, Socket, SocketOptions, SocketType};

fn options() -> SocketOptions {
    SocketOptions::default().with_linger(Some(Duration::ZERO))
}

#[test]
fn test_server_replies_by_routing_id() {
    zmqio::run(async {
        let server = Socket::<Addressable>::open(SocketType::Server, None, options()).unwrap();
        server.bind("inproc://draft-server").await.unwrap();

        // CLIENT messages carry no routing id; it is a plain socket.
        let client = Socket::with_options(SocketType::Client, options()).unwrap();
        client.connect("inproc://draft-server").unwrap();
        client.send("ping").await.unwrap();

        let request = server.receive().await.unwrap();
        assert_eq!(request[0], "ping");
        let routing_id = *request.meta();
        assert_ne!(routing_id, 0);

        server.send_with("pong", routing_id).await.unwrap();
        assert_eq!(client.receive().await.unwrap()[0], "pong");
    })
    .unwrap();
}

#[test]
fn test_dish_receives_joined_group() {
    let port = portpicker::pick_unused_port().expect("no free port");
    let endpoint = format!("udp://127.0.0.1:{port}");
    zmqio::run(async move {
        let dish = Socket::<Grouped>::open(SocketType::Dish, None, options()).unwrap();
        dish.bind(&endpoint).await.unwrap();
        dish.join("weather").unwrap();

        let radio = Socket::<Grouped>::open(SocketType::Radio, None, options()).unwrap();
        radio.connect(&endpoint).unwrap();

        // UDP drops datagrams sent before the pipe is up; repeat until one lands.
        let mut pending = dish.receive();
        let received = loop {
            radio.send_with("ignored", "traffic".to_string()).await.unwrap();
            radio.send_with("sunny", "weather".to_string()).await.unwrap();
            if let Ok(received) = tokio::time::timeout(Duration::from_millis(50), &mut pending).await {
                break received.unwrap();
            }
        };
        assert_eq!(received.meta(), "weather");
        assert_eq!(received[0], "sunny");

        dish.leave("weather").unwrap();
    })
    .unwrap();
}

#[test]
fn test_basic_socket_rejects_routed_types() {
    zmqio::run(async {
        let err = Socket::new(SocketType::Server).unwrap_err();
        assert!(matches!(err, zmqio::Error::Argument(_)));
        let err = Socket::<Grouped>::open(SocketType::Server, None, options()).unwrap_err();
        assert!(matches!(err, zmqio::Error::Argument(_)));
    })
    .unwrap();
}
