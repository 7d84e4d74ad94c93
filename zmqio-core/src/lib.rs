//! zmqio Core
//!
//! This crate contains the thread-agnostic building blocks of zmqio:
//! - Owned libzmq handles: context, socket, message (`transport`)
//! - Send/receive buffer ownership and zero-copy hand-off (`message`)
//! - Deferred reclamation of buffers released by libzmq threads (`trash`)
//! - Reverse-order disposal of still-open resources (`reaper`)
//! - Typed socket and context options (`options`)
//! - Monitor event decoding (`monitor`)
//! - Error types (`error`)

// Only the FFI-facing modules opt back in.
#![cfg_attr(not(test), deny(unsafe_code))]
// Allow some pedantic lints that are intentional in this crate
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
pub mod error;
pub mod message;
pub mod message_builder;
pub mod monitor;
pub mod options;
pub mod reaper;
pub mod socket_type;
pub mod transport;
pub mod trash;

// Optional: a small prelude to make downstream crates ergonomic.
// Keep it minimal to avoid API lock-in.
pub mod prelude {
    pub use crate::error::{Errno, Error, Result};
    pub use crate::message_builder::Message;
    pub use crate::monitor::{Event, EventDetail, EventType};
    pub use crate::options::{ContextOptions, GetOption, SetOption, SocketOptions};
    pub use crate::socket_type::SocketType;
}
