//! Endpoint bookkeeping under arbitrary bind/unbind/connect/disconnect/close
//! sequences.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use zmqio::{Socket, SocketOptions, SocketState, SocketType};

#[derive(Debug, Clone, Copy)]
enum Op {
    Bind(u8),
    Unbind(u8),
    Connect(u8),
    Disconnect(u8),
    Close,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..3_u8).prop_map(Op::Bind),
        3 => (0..3_u8).prop_map(Op::Unbind),
        4 => (0..3_u8).prop_map(Op::Connect),
        3 => (0..3_u8).prop_map(Op::Disconnect),
        1 => Just(Op::Close),
    ]
}

#[derive(Default)]
struct Model {
    bound: BTreeSet<u8>,
    connected: BTreeSet<u8>,
    closed: bool,
}

impl Model {
    fn endpoints(&self) -> u32 {
        if self.closed {
            0
        } else {
            (self.bound.len() + self.connected.len()) as u32
        }
    }
}

static CASE: AtomicUsize = AtomicUsize::new(0);

async fn check(ops: Vec<Op>) {
    let case = CASE.fetch_add(1, Ordering::Relaxed);
    let bind_addr = |i: u8| format!("inproc://prop-{case}-bind-{i}");
    let peer_addr = |i: u8| format!("inproc://prop-{case}-peer-{i}");

    let options = SocketOptions::default().with_linger(Some(Duration::ZERO));
    let socket = Socket::with_options(SocketType::Dealer, options).unwrap();
    let mut model = Model::default();

    for op in ops {
        match op {
            Op::Bind(i) => {
                let result = socket.bind(&bind_addr(i)).await;
                let expect_ok = !model.closed && !model.bound.contains(&i);
                assert_eq!(result.is_ok(), expect_ok, "{op:?}: {result:?}");
                if expect_ok {
                    model.bound.insert(i);
                }
            }
            Op::Unbind(i) => {
                let result = socket.unbind(&bind_addr(i)).await;
                let expect_ok = !model.closed && model.bound.contains(&i);
                assert_eq!(result.is_ok(), expect_ok, "{op:?}: {result:?}");
                model.bound.remove(&i);
            }
            Op::Connect(i) => {
                if !model.closed && model.connected.contains(&i) {
                    continue;
                }
                let result = socket.connect(&peer_addr(i));
                assert_eq!(result.is_ok(), !model.closed, "{op:?}: {result:?}");
                if !model.closed {
                    model.connected.insert(i);
                }
            }
            Op::Disconnect(i) => {
                let result = socket.disconnect(&peer_addr(i));
                let expect_ok = !model.closed && model.connected.contains(&i);
                assert_eq!(result.is_ok(), expect_ok, "{op:?}: {result:?}");
                model.connected.remove(&i);
            }
            Op::Close => {
                socket.close();
                model.closed = true;
            }
        }

        assert_eq!(socket.endpoints(), model.endpoints(), "after {op:?}");
        assert_eq!(socket.is_closed(), model.closed);
        assert_ne!(socket.state(), SocketState::Blocked);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_endpoint_count_tracks_operations(ops in prop::collection::vec(op(), 1..24)) {
        zmqio::run(check(ops)).unwrap();
    }
}
