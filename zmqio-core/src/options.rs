//! Socket and context configuration options
//!
//! Options are small integer identifiers (the `ZMQ_*` constants passed to
//! `zmq_setsockopt`/`zmq_getsockopt`), each with a value kind. Values are
//! encoded through [`SetOption`] and decoded through [`GetOption`]; the kind
//! of every known identifier is checked before the native call is made.

use crate::error::{Error, Result};
use bytes::Bytes;
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Socket option identifiers.
pub mod id {
    pub const AFFINITY: i32 = 4;
    pub const ROUTING_ID: i32 = 5;
    pub const SUBSCRIBE: i32 = 6;
    pub const UNSUBSCRIBE: i32 = 7;
    pub const RATE: i32 = 8;
    pub const RECOVERY_IVL: i32 = 9;
    pub const SNDBUF: i32 = 11;
    pub const RCVBUF: i32 = 12;
    pub const RCVMORE: i32 = 13;
    pub const EVENTS: i32 = 15;
    pub const TYPE: i32 = 16;
    pub const LINGER: i32 = 17;
    pub const RECONNECT_IVL: i32 = 18;
    pub const BACKLOG: i32 = 19;
    pub const RECONNECT_IVL_MAX: i32 = 21;
    pub const MAXMSGSIZE: i32 = 22;
    pub const SNDHWM: i32 = 23;
    pub const RCVHWM: i32 = 24;
    pub const MULTICAST_HOPS: i32 = 25;
    pub const RCVTIMEO: i32 = 27;
    pub const SNDTIMEO: i32 = 28;
    pub const LAST_ENDPOINT: i32 = 32;
    pub const ROUTER_MANDATORY: i32 = 33;
    pub const TCP_KEEPALIVE: i32 = 34;
    pub const TCP_KEEPALIVE_CNT: i32 = 35;
    pub const TCP_KEEPALIVE_IDLE: i32 = 36;
    pub const TCP_KEEPALIVE_INTVL: i32 = 37;
    pub const IMMEDIATE: i32 = 39;
    pub const XPUB_VERBOSE: i32 = 40;
    pub const ROUTER_RAW: i32 = 41;
    pub const IPV6: i32 = 42;
    pub const MECHANISM: i32 = 43;
    pub const PLAIN_SERVER: i32 = 44;
    pub const PLAIN_USERNAME: i32 = 45;
    pub const PLAIN_PASSWORD: i32 = 46;
    pub const CURVE_SERVER: i32 = 47;
    pub const CURVE_PUBLICKEY: i32 = 48;
    pub const CURVE_SECRETKEY: i32 = 49;
    pub const CURVE_SERVERKEY: i32 = 50;
    pub const PROBE_ROUTER: i32 = 51;
    pub const REQ_CORRELATE: i32 = 52;
    pub const REQ_RELAXED: i32 = 53;
    pub const CONFLATE: i32 = 54;
    pub const ZAP_DOMAIN: i32 = 55;
    pub const ROUTER_HANDOVER: i32 = 56;
    pub const TOS: i32 = 57;
    pub const CONNECT_ROUTING_ID: i32 = 61;
    pub const HANDSHAKE_IVL: i32 = 66;
    pub const SOCKS_PROXY: i32 = 68;
    pub const XPUB_NODROP: i32 = 69;
    pub const XPUB_MANUAL: i32 = 71;
    pub const XPUB_WELCOME_MSG: i32 = 72;
    pub const STREAM_NOTIFY: i32 = 73;
    pub const INVERT_MATCHING: i32 = 74;
    pub const HEARTBEAT_IVL: i32 = 75;
    pub const HEARTBEAT_TTL: i32 = 76;
    pub const HEARTBEAT_TIMEOUT: i32 = 77;
    pub const XPUB_VERBOSER: i32 = 78;
    pub const CONNECT_TIMEOUT: i32 = 79;
    pub const TCP_MAXRT: i32 = 80;
    pub const THREAD_SAFE: i32 = 81;
    pub const MULTICAST_MAXTPDU: i32 = 84;
    pub const USE_FD: i32 = 89;
    pub const BINDTODEVICE: i32 = 92;
}

/// Context option identifiers.
pub mod ctx_id {
    pub const IO_THREADS: i32 = 1;
    pub const MAX_SOCKETS: i32 = 2;
    /// Read-only.
    pub const SOCKET_LIMIT: i32 = 3;
    /// Write-only; shares its number with `SOCKET_LIMIT`.
    pub const THREAD_PRIORITY: i32 = 3;
    pub const THREAD_SCHED_POLICY: i32 = 4;
    pub const MAX_MSGSZ: i32 = 5;
    pub const IPV6: i32 = 42;
    pub const BLOCKY: i32 = 70;
}

/// Value kind of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Bool,
    Int32,
    Uint32,
    Int64,
    Uint64,
    /// String or binary buffer.
    String,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "boolean",
            Self::Int32 => "32-bit integer",
            Self::Uint32 => "32-bit unsigned integer",
            Self::Int64 => "64-bit integer",
            Self::Uint64 => "64-bit unsigned integer",
            Self::String => "string or buffer",
        })
    }
}

const KNOWN: &[(i32, OptionKind)] = {
    use OptionKind::{Bool, Int32, Int64, String, Uint32, Uint64};
    &[
        (id::AFFINITY, Uint64),
        (id::ROUTING_ID, String),
        (id::SUBSCRIBE, String),
        (id::UNSUBSCRIBE, String),
        (id::RATE, Int32),
        (id::RECOVERY_IVL, Int32),
        (id::SNDBUF, Int32),
        (id::RCVBUF, Int32),
        (id::RCVMORE, Bool),
        (id::EVENTS, Int32),
        (id::TYPE, Int32),
        (id::LINGER, Int32),
        (id::RECONNECT_IVL, Int32),
        (id::BACKLOG, Int32),
        (id::RECONNECT_IVL_MAX, Int32),
        (id::MAXMSGSIZE, Int64),
        (id::SNDHWM, Int32),
        (id::RCVHWM, Int32),
        (id::MULTICAST_HOPS, Int32),
        (id::RCVTIMEO, Int32),
        (id::SNDTIMEO, Int32),
        (id::LAST_ENDPOINT, String),
        (id::ROUTER_MANDATORY, Bool),
        (id::TCP_KEEPALIVE, Int32),
        (id::TCP_KEEPALIVE_CNT, Int32),
        (id::TCP_KEEPALIVE_IDLE, Int32),
        (id::TCP_KEEPALIVE_INTVL, Int32),
        (id::IMMEDIATE, Bool),
        (id::XPUB_VERBOSE, Bool),
        (id::ROUTER_RAW, Bool),
        (id::IPV6, Bool),
        (id::MECHANISM, Int32),
        (id::PLAIN_SERVER, Bool),
        (id::PLAIN_USERNAME, String),
        (id::PLAIN_PASSWORD, String),
        (id::CURVE_SERVER, Bool),
        (id::CURVE_PUBLICKEY, String),
        (id::CURVE_SECRETKEY, String),
        (id::CURVE_SERVERKEY, String),
        (id::PROBE_ROUTER, Bool),
        (id::REQ_CORRELATE, Bool),
        (id::REQ_RELAXED, Bool),
        (id::CONFLATE, Bool),
        (id::ZAP_DOMAIN, String),
        (id::ROUTER_HANDOVER, Bool),
        (id::TOS, Uint32),
        (id::CONNECT_ROUTING_ID, String),
        (id::HANDSHAKE_IVL, Int32),
        (id::SOCKS_PROXY, String),
        (id::XPUB_NODROP, Bool),
        (id::XPUB_MANUAL, Bool),
        (id::XPUB_WELCOME_MSG, String),
        (id::STREAM_NOTIFY, Bool),
        (id::INVERT_MATCHING, Bool),
        (id::HEARTBEAT_IVL, Int32),
        (id::HEARTBEAT_TTL, Int32),
        (id::HEARTBEAT_TIMEOUT, Int32),
        (id::XPUB_VERBOSER, Bool),
        (id::CONNECT_TIMEOUT, Int32),
        (id::TCP_MAXRT, Int32),
        (id::THREAD_SAFE, Bool),
        (id::MULTICAST_MAXTPDU, Int32),
        (id::USE_FD, Int32),
        (id::BINDTODEVICE, String),
    ]
};

/// Options that take effect on a socket that is already bound or
/// connected. Setting any other option afterwards only affects the next
/// bind/connect.
const IMMEDIATE: &[i32] = &[
    id::SUBSCRIBE,
    id::UNSUBSCRIBE,
    id::LINGER,
    id::ROUTER_MANDATORY,
    id::PROBE_ROUTER,
    id::XPUB_VERBOSE,
    id::XPUB_VERBOSER,
    id::REQ_CORRELATE,
    id::REQ_RELAXED,
    id::ROUTER_HANDOVER,
    id::SNDHWM,
    id::RCVHWM,
    id::SNDTIMEO,
    id::RCVTIMEO,
];

/// Kind of a known option identifier.
#[must_use]
pub fn kind_of(id: i32) -> Option<OptionKind> {
    KNOWN.iter().find(|(known, _)| *known == id).map(|(_, kind)| *kind)
}

#[must_use]
pub fn is_immediate(id: i32) -> bool {
    IMMEDIATE.contains(&id)
}

/// Validates an identifier and the kind of value used with it.
///
/// # Errors
///
/// Argument error for a negative identifier or a kind mismatch on a
/// known identifier. Unknown identifiers pass through to libzmq.
pub fn check(id: i32, kind: OptionKind) -> Result<()> {
    if id < 0 {
        return Err(Error::argument("Identifier must be a non-negative integer"));
    }
    match kind_of(id) {
        Some(expected) if expected != kind => {
            Err(Error::argument(format!("Option value must be a {expected}")))
        }
        _ => Ok(()),
    }
}

/// Value that can be written to an option.
pub trait SetOption {
    const KIND: OptionKind;

    fn encode(&self) -> Cow<'_, [u8]>;
}

/// Value that can be read from an option.
pub trait GetOption: Sized {
    const KIND: OptionKind;
    /// Buffer size handed to `zmq_getsockopt`.
    const CAPACITY: usize;

    /// # Errors
    ///
    /// Argument error if libzmq returned a value of unexpected size.
    fn decode(buf: &[u8]) -> Result<Self>;
}

macro_rules! numeric_option {
    ($($ty:ty => $kind:ident),* $(,)?) => {$(
        impl SetOption for $ty {
            const KIND: OptionKind = OptionKind::$kind;

            fn encode(&self) -> Cow<'_, [u8]> {
                Cow::Owned(self.to_ne_bytes().to_vec())
            }
        }

        impl GetOption for $ty {
            const KIND: OptionKind = OptionKind::$kind;
            const CAPACITY: usize = std::mem::size_of::<$ty>();

            fn decode(buf: &[u8]) -> Result<Self> {
                buf.try_into()
                    .map(<$ty>::from_ne_bytes)
                    .map_err(|_| Error::argument(format!("Unexpected option size {}", buf.len())))
            }
        }
    )*};
}

numeric_option!(i32 => Int32, u32 => Uint32, i64 => Int64, u64 => Uint64);

impl SetOption for bool {
    const KIND: OptionKind = OptionKind::Bool;

    fn encode(&self) -> Cow<'_, [u8]> {
        Cow::Owned(i32::from(*self).to_ne_bytes().to_vec())
    }
}

impl GetOption for bool {
    const KIND: OptionKind = OptionKind::Bool;
    const CAPACITY: usize = std::mem::size_of::<i32>();

    fn decode(buf: &[u8]) -> Result<Self> {
        i32::decode(buf).map(|value| value != 0)
    }
}

impl SetOption for &str {
    const KIND: OptionKind = OptionKind::String;

    fn encode(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl SetOption for String {
    const KIND: OptionKind = OptionKind::String;

    fn encode(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl SetOption for &[u8] {
    const KIND: OptionKind = OptionKind::String;

    fn encode(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(*self)
    }
}

impl SetOption for Vec<u8> {
    const KIND: OptionKind = OptionKind::String;

    fn encode(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl SetOption for Bytes {
    const KIND: OptionKind = OptionKind::String;

    fn encode(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self[..])
    }
}

/// String options read back as `None` when unset.
impl GetOption for Option<String> {
    const KIND: OptionKind = OptionKind::String;
    const CAPACITY: usize = 1024;

    fn decode(buf: &[u8]) -> Result<Self> {
        let text = buf.strip_suffix(&[0]).unwrap_or(buf);
        if text.is_empty() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(text).into_owned()))
    }
}

/// Binary options (routing ids, raw CURVE keys) read back verbatim.
impl GetOption for Vec<u8> {
    const KIND: OptionKind = OptionKind::String;
    const CAPACITY: usize = 1024;

    fn decode(buf: &[u8]) -> Result<Self> {
        Ok(buf.to_vec())
    }
}

/// One pending option write: identifier, kind and encoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    pub id: i32,
    pub kind: OptionKind,
    pub value: Vec<u8>,
}

impl OptionEntry {
    pub fn new<T: SetOption>(id: i32, value: T) -> Self {
        Self {
            id,
            kind: T::KIND,
            value: value.encode().into_owned(),
        }
    }
}

fn millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

/// Initial socket options, applied right after the socket is created.
///
/// Unset fields keep libzmq's defaults.
///
/// # Examples
///
/// ```
/// use zmqio_core::options::SocketOptions;
/// use std::time::Duration;
///
/// let opts = SocketOptions::default()
///     .with_recv_timeout(Duration::from_secs(5))
///     .with_send_timeout(Duration::ZERO)
///     .with_linger(Some(Duration::ZERO));
/// assert_eq!(opts.entries().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SocketOptions {
    /// Receive timeout (ZMQ_RCVTIMEO)
    ///
    /// - `None`: Block indefinitely (default)
    /// - `Some(Duration::ZERO)`: Never wait, fail with EAGAIN
    /// - `Some(duration)`: Wait up to duration before failing with EAGAIN
    pub recv_timeout: Option<Duration>,

    /// Send timeout (ZMQ_SNDTIMEO), same semantics as `recv_timeout`
    pub send_timeout: Option<Duration>,

    /// Linger (ZMQ_LINGER)
    ///
    /// - `None`: Wait indefinitely for pending messages on close
    /// - `Some(duration)`: Discard pending messages after duration
    pub linger: Option<Option<Duration>>,

    /// Reconnect interval (ZMQ_RECONNECT_IVL)
    pub reconnect_ivl: Option<Duration>,

    /// Maximum reconnect interval for exponential backoff (ZMQ_RECONNECT_IVL_MAX)
    pub reconnect_ivl_max: Option<Duration>,

    /// TCP connect timeout (ZMQ_CONNECT_TIMEOUT)
    pub connect_timeout: Option<Duration>,

    /// ZMTP handshake timeout (ZMQ_HANDSHAKE_IVL)
    pub handshake_timeout: Option<Duration>,

    /// High water mark for receiving (ZMQ_RCVHWM)
    pub recv_hwm: Option<i32>,

    /// High water mark for sending (ZMQ_SNDHWM)
    pub send_hwm: Option<i32>,

    /// Only queue messages to completed connections (ZMQ_IMMEDIATE)
    pub immediate: Option<bool>,

    /// Maximum inbound message size, -1 for no limit (ZMQ_MAXMSGSIZE)
    pub max_msg_size: Option<i64>,

    /// Socket identity / routing ID (ZMQ_ROUTING_ID)
    pub routing_id: Option<Bytes>,

    /// Keep only the last message (ZMQ_CONFLATE)
    pub conflate: Option<bool>,

    /// Enable IPv6 on the socket (ZMQ_IPV6)
    pub ipv6: Option<bool>,

    extra: Vec<OptionEntry>,
}

impl SocketOptions {
    /// Create new socket options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set receive timeout.
    #[must_use]
    pub fn with_recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    /// Set send timeout.
    #[must_use]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Set linger timeout. `None` lingers forever.
    #[must_use]
    pub fn with_linger(mut self, linger: Option<Duration>) -> Self {
        self.linger = Some(linger);
        self
    }

    #[must_use]
    pub fn with_reconnect_ivl(mut self, ivl: Duration) -> Self {
        self.reconnect_ivl = Some(ivl);
        self
    }

    #[must_use]
    pub fn with_reconnect_ivl_max(mut self, max: Duration) -> Self {
        self.reconnect_ivl_max = Some(max);
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_recv_hwm(mut self, hwm: i32) -> Self {
        self.recv_hwm = Some(hwm);
        self
    }

    #[must_use]
    pub fn with_send_hwm(mut self, hwm: i32) -> Self {
        self.send_hwm = Some(hwm);
        self
    }

    #[must_use]
    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.immediate = Some(immediate);
        self
    }

    #[must_use]
    pub fn with_max_msg_size(mut self, size: i64) -> Self {
        self.max_msg_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_routing_id(mut self, routing_id: impl Into<Bytes>) -> Self {
        self.routing_id = Some(routing_id.into());
        self
    }

    #[must_use]
    pub fn with_conflate(mut self, conflate: bool) -> Self {
        self.conflate = Some(conflate);
        self
    }

    #[must_use]
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = Some(ipv6);
        self
    }

    /// Any other option by identifier. Applied after the named fields,
    /// in insertion order.
    ///
    /// ```
    /// use zmqio_core::options::{id, SocketOptions};
    ///
    /// let opts = SocketOptions::new().with_option(id::TCP_KEEPALIVE, 1_i32);
    /// assert_eq!(opts.entries()[0].id, id::TCP_KEEPALIVE);
    /// ```
    #[must_use]
    pub fn with_option<T: SetOption>(mut self, id: i32, value: T) -> Self {
        self.extra.push(OptionEntry::new(id, value));
        self
    }

    /// Every configured option, in application order.
    #[must_use]
    pub fn entries(&self) -> Vec<OptionEntry> {
        let mut entries = Vec::new();
        let mut push_ms = |id, value: Option<Duration>| {
            if let Some(value) = value {
                entries.push(OptionEntry::new(id, millis(value)));
            }
        };
        push_ms(id::RCVTIMEO, self.recv_timeout);
        push_ms(id::SNDTIMEO, self.send_timeout);
        push_ms(id::RECONNECT_IVL, self.reconnect_ivl);
        push_ms(id::RECONNECT_IVL_MAX, self.reconnect_ivl_max);
        push_ms(id::CONNECT_TIMEOUT, self.connect_timeout);
        push_ms(id::HANDSHAKE_IVL, self.handshake_timeout);

        if let Some(linger) = self.linger {
            entries.push(OptionEntry::new(id::LINGER, linger.map_or(-1, millis)));
        }
        if let Some(hwm) = self.recv_hwm {
            entries.push(OptionEntry::new(id::RCVHWM, hwm));
        }
        if let Some(hwm) = self.send_hwm {
            entries.push(OptionEntry::new(id::SNDHWM, hwm));
        }
        if let Some(immediate) = self.immediate {
            entries.push(OptionEntry::new(id::IMMEDIATE, immediate));
        }
        if let Some(size) = self.max_msg_size {
            entries.push(OptionEntry::new(id::MAXMSGSIZE, size));
        }
        if let Some(routing_id) = &self.routing_id {
            entries.push(OptionEntry::new(id::ROUTING_ID, routing_id.clone()));
        }
        if let Some(conflate) = self.conflate {
            entries.push(OptionEntry::new(id::CONFLATE, conflate));
        }
        if let Some(ipv6) = self.ipv6 {
            entries.push(OptionEntry::new(id::IPV6, ipv6));
        }
        entries.extend(self.extra.iter().cloned());
        entries
    }
}

/// Options for a private context, applied right after it is created.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub io_threads: Option<i32>,
    pub max_sockets: Option<i32>,
    pub max_message_size: Option<i32>,
    pub thread_priority: Option<i32>,
    pub thread_scheduling_policy: Option<i32>,
    pub ipv6: Option<bool>,
    /// When false, context termination does not wait for sockets with
    /// linger to flush.
    pub blocky: Option<bool>,
}

impl ContextOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_io_threads(mut self, threads: i32) -> Self {
        self.io_threads = Some(threads);
        self
    }

    #[must_use]
    pub fn with_max_sockets(mut self, max: i32) -> Self {
        self.max_sockets = Some(max);
        self
    }

    #[must_use]
    pub fn with_max_message_size(mut self, max: i32) -> Self {
        self.max_message_size = Some(max);
        self
    }

    #[must_use]
    pub fn with_thread_priority(mut self, priority: i32) -> Self {
        self.thread_priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_thread_scheduling_policy(mut self, policy: i32) -> Self {
        self.thread_scheduling_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn with_ipv6(mut self, ipv6: bool) -> Self {
        self.ipv6 = Some(ipv6);
        self
    }

    #[must_use]
    pub fn with_blocky(mut self, blocky: bool) -> Self {
        self.blocky = Some(blocky);
        self
    }

    /// `(identifier, value)` pairs in application order.
    #[must_use]
    pub fn entries(&self) -> Vec<(i32, i32)> {
        [
            (ctx_id::IO_THREADS, self.io_threads),
            (ctx_id::MAX_SOCKETS, self.max_sockets),
            (ctx_id::MAX_MSGSZ, self.max_message_size),
            (ctx_id::THREAD_PRIORITY, self.thread_priority),
            (ctx_id::THREAD_SCHED_POLICY, self.thread_scheduling_policy),
            (ctx_id::IPV6, self.ipv6.map(i32::from)),
            (ctx_id::BLOCKY, self.blocky.map(i32::from)),
        ]
        .into_iter()
        .filter_map(|(id, value)| value.map(|value| (id, value)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lookup() {
        assert_eq!(kind_of(id::SNDTIMEO), Some(OptionKind::Int32));
        assert_eq!(kind_of(id::MAXMSGSIZE), Some(OptionKind::Int64));
        assert_eq!(kind_of(id::AFFINITY), Some(OptionKind::Uint64));
        assert_eq!(kind_of(id::ROUTING_ID), Some(OptionKind::String));
        assert_eq!(kind_of(9999), None);
    }

    #[test]
    fn test_check_rejects_mismatch() {
        assert!(check(id::LINGER, OptionKind::Int32).is_ok());
        let err = check(id::LINGER, OptionKind::String).unwrap_err();
        assert_eq!(err.to_string(), "Option value must be a 32-bit integer");
        assert!(matches!(check(-1, OptionKind::Int32), Err(Error::Argument(_))));
        assert!(check(9999, OptionKind::Bool).is_ok());
    }

    #[test]
    fn test_immediate_options() {
        assert!(is_immediate(id::SUBSCRIBE));
        assert!(is_immediate(id::SNDHWM));
        assert!(!is_immediate(id::ROUTING_ID));
        assert!(!is_immediate(id::IPV6));
    }

    #[test]
    fn test_numeric_encoding() {
        assert_eq!(i32::decode(&42_i32.encode()).unwrap(), 42);
        assert_eq!(u64::decode(&u64::MAX.encode()).unwrap(), u64::MAX);
        assert!(bool::decode(&true.encode()).unwrap());
        assert!(i64::decode(&[0, 1]).is_err());
    }

    #[test]
    fn test_string_decoding() {
        assert_eq!(Option::<String>::decode(b"").unwrap(), None);
        assert_eq!(Option::<String>::decode(b"\0").unwrap(), None);
        assert_eq!(
            Option::<String>::decode(b"tcp://127.0.0.1:5555\0").unwrap().as_deref(),
            Some("tcp://127.0.0.1:5555")
        );
    }

    #[test]
    fn test_socket_options_entries() {
        let opts = SocketOptions::new()
            .with_send_timeout(Duration::from_millis(250))
            .with_linger(None)
            .with_routing_id("client-1")
            .with_option(id::TOS, 8_u32);

        let entries = opts.entries();
        assert_eq!(entries[0], OptionEntry::new(id::SNDTIMEO, 250_i32));
        assert_eq!(entries[1], OptionEntry::new(id::LINGER, -1_i32));
        assert_eq!(entries[2].kind, OptionKind::String);
        assert_eq!(entries[2].value, b"client-1");
        assert_eq!(entries[3].id, id::TOS);
    }

    #[test]
    fn test_context_options_entries() {
        let opts = ContextOptions::new().with_io_threads(2).with_blocky(false);
        assert_eq!(opts.entries(), vec![(ctx_id::IO_THREADS, 2), (ctx_id::BLOCKY, 0)]);
        assert!(ContextOptions::default().entries().is_empty());
    }
}
