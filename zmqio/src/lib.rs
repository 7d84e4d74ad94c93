//! # zmqio
//!
//! Asynchronous libzmq sockets for single-threaded tokio hosts.
//!
//! ## Architecture
//!
//! zmqio bridges libzmq's edge-triggered readiness descriptor into a
//! cooperative, single-threaded task model:
//!
//! - **`zmqio-core`**: owned libzmq handles, zero-copy buffer hand-off,
//!   deferred reclamation, reapers, options and event decoding
//! - **`zmqio`**: the host side (this crate): poller, socket state machine,
//!   observers, contexts, proxy
//!
//! Every object lives on the thread that created it, inside a
//! [`LocalSet`](tokio::task::LocalSet). [`run`] sets that up and closes
//! whatever is still open, newest first, when the driven future completes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zmqio::{Socket, SocketType};
//!
//! zmqio::run(async {
//!     let push = Socket::new(SocketType::Push)?;
//!     let pull = Socket::new(SocketType::Pull)?;
//!     pull.bind("inproc://work").await?;
//!     push.connect("inproc://work")?;
//!
//!     push.send(["job", "42"]).await?;
//!     let job = pull.receive().await?;
//!     assert_eq!(job.len(), 2);
//!     Ok::<_, zmqio::Error>(())
//! })
//! .unwrap()
//! .unwrap();
//! ```
//!
//! ## Operations
//!
//! - `send`/`receive` return a [`Reply`], settled in place when the socket is
//!   ready; one of each may be outstanding per socket
//! - `bind`/`unbind` run on the blocking pool and block the socket meanwhile
//! - payloads above 128 bytes are handed to libzmq without copying; libzmq
//!   releases them back to the owning thread
//!
//! ## Safety
//!
//! - `unsafe` code is isolated to the FFI modules of `zmqio-core`
//!   (`transport`, `message`, `error`)
//! - This crate is 100% safe Rust

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod agent;
pub mod capability;
mod context;
pub mod dev_tracing;
mod observer;
mod poller;
mod proxy;
mod runtime;
mod socket;
mod variant;

pub use bytes::Bytes;

pub use context::Context;
pub use observer::Observer;
pub use proxy::Proxy;
pub use runtime::{run, Reply};
pub use socket::{Socket, SocketState, MAX_SYNC_OPERATIONS};
#[cfg(feature = "draft")]
pub use variant::{Addressable, Grouped};
pub use variant::{Basic, Received, Variant};

pub use agent::TERMINATE_WARNING_DELAY;
pub use zmqio_core::error::{AuthError, Errno, Error, ProtocolError, Result};
pub use zmqio_core::message::{external_memory, ZERO_COPY_THRESHOLD};
pub use zmqio_core::message_builder::Message;
pub use zmqio_core::monitor::{Event, EventDetail, EventType};
pub use zmqio_core::options::{id, ContextOptions, GetOption, OptionKind, SetOption, SocketOptions};
pub use zmqio_core::socket_type::SocketType;

/// Convenient imports.
///
/// # Example
///
/// ```rust
/// use zmqio::prelude::*;
///
/// // Now you have:
/// // - Socket, SocketType, Observer, Context
/// // - Message and Bytes for payloads
/// ```
pub mod prelude {
    pub use crate::{
        run, Bytes, Context, ContextOptions, Error, Message, Observer, Result, Socket,
        SocketOptions, SocketType,
    };
}
