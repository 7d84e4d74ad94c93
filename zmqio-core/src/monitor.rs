//! Socket event decoding.
//!
//! libzmq publishes socket lifecycle events on a monitor endpoint as
//! two-part messages: a 6-byte header (native-endian `u16` event id followed
//! by a `u32` value) and the affected endpoint address. [`Event::decode`]
//! turns one such pair into a structured [`Event`].

use crate::error::{AuthError, Errno, Error, ProtocolError, Result};
use std::fmt;

/// Length of the binary header part.
pub const HEADER_LEN: usize = 6;

/// Socket lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Connect,
    ConnectDelay,
    ConnectRetry,
    Bind,
    BindError,
    Accept,
    AcceptError,
    Close,
    CloseError,
    Disconnect,
    /// The monitor stopped; no further events follow.
    End,
    HandshakeErrorOther,
    Handshake,
    HandshakeErrorProtocol,
    HandshakeErrorAuth,
    Unknown,
}

impl EventType {
    #[must_use]
    pub const fn from_id(id: u16) -> Self {
        match id {
            0x0001 => Self::Connect,
            0x0002 => Self::ConnectDelay,
            0x0004 => Self::ConnectRetry,
            0x0008 => Self::Bind,
            0x0010 => Self::BindError,
            0x0020 => Self::Accept,
            0x0040 => Self::AcceptError,
            0x0080 => Self::Close,
            0x0100 => Self::CloseError,
            0x0200 => Self::Disconnect,
            0x0400 => Self::End,
            0x0800 => Self::HandshakeErrorOther,
            0x1000 => Self::Handshake,
            0x2000 => Self::HandshakeErrorProtocol,
            0x4000 => Self::HandshakeErrorAuth,
            _ => Self::Unknown,
        }
    }

    /// Event name, e.g. `"handshake:error:auth"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::ConnectDelay => "connect:delay",
            Self::ConnectRetry => "connect:retry",
            Self::Bind => "bind",
            Self::BindError => "bind:error",
            Self::Accept => "accept",
            Self::AcceptError => "accept:error",
            Self::Close => "close",
            Self::CloseError => "close:error",
            Self::Disconnect => "disconnect",
            Self::End => "end",
            Self::HandshakeErrorOther => "handshake:error:other",
            Self::Handshake => "handshake",
            Self::HandshakeErrorProtocol => "handshake:error:protocol",
            Self::HandshakeErrorAuth => "handshake:error:auth",
            Self::Unknown => "unknown",
        }
    }

    /// Failure events whose value is a native error number.
    #[must_use]
    pub const fn carries_errno(self) -> bool {
        matches!(
            self,
            Self::BindError
                | Self::AcceptError
                | Self::CloseError
                | Self::HandshakeErrorOther
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra information carried by the event value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    None,
    /// Milliseconds until the next reconnect attempt.
    RetryInterval(u32),
    Error(Errno),
    Protocol(ProtocolError),
    Auth(AuthError),
}

/// One decoded socket event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventType,
    /// Endpoint the event refers to; empty when libzmq reports none.
    pub address: String,
    pub detail: EventDetail,
}

impl Event {
    /// Decodes a header part and an address part.
    ///
    /// # Errors
    ///
    /// `EPROTO` if the header is not exactly [`HEADER_LEN`] bytes.
    pub fn decode(header: &[u8], address: &[u8]) -> Result<Self> {
        let header: &[u8; HEADER_LEN] = header
            .try_into()
            .map_err(|_| Error::native(Errno::EPROTO))?;
        let id = u16::from_ne_bytes([header[0], header[1]]);
        let value = u32::from_ne_bytes([header[2], header[3], header[4], header[5]]);

        let kind = EventType::from_id(id);
        let detail = match kind {
            EventType::ConnectRetry => EventDetail::RetryInterval(value),
            EventType::HandshakeErrorProtocol => EventDetail::Protocol(ProtocolError::new(value)),
            EventType::HandshakeErrorAuth => EventDetail::Auth(AuthError::new(value)),
            kind if kind.carries_errno() => EventDetail::Error(Errno(value as i32)),
            _ => EventDetail::None,
        };

        Ok(Self {
            kind,
            address: String::from_utf8_lossy(address).into_owned(),
            detail,
        })
    }

    /// The failure this event reports, if any.
    #[must_use]
    pub fn error(&self) -> Option<Error> {
        match &self.detail {
            EventDetail::Error(errno) => Some(Error::at(*errno, self.address.clone())),
            EventDetail::Protocol(protocol) => Some(Error::Protocol(*protocol)),
            EventDetail::Auth(auth) => Some(Error::Auth(*auth)),
            EventDetail::None | EventDetail::RetryInterval(_) => None,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.kind == EventType::End
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.address)?;
        match &self.detail {
            EventDetail::None => Ok(()),
            EventDetail::RetryInterval(ms) => write!(f, " (retry in {ms}ms)"),
            EventDetail::Error(errno) => write!(f, " ({})", errno.code()),
            EventDetail::Protocol(protocol) => write!(f, " ({protocol})"),
            EventDetail::Auth(auth) => write!(f, " ({auth})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(id: u16, value: u32) -> Vec<u8> {
        let mut out = id.to_ne_bytes().to_vec();
        out.extend_from_slice(&value.to_ne_bytes());
        out
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventType::from_id(0x8).as_str(), "bind");
        assert_eq!(EventType::from_id(0x2).as_str(), "connect:delay");
        assert_eq!(EventType::from_id(0x400).as_str(), "end");
        assert_eq!(EventType::from_id(0x4000).as_str(), "handshake:error:auth");
        assert_eq!(EventType::from_id(0x8000).as_str(), "unknown");
        assert_eq!(EventType::from_id(0x3).as_str(), "unknown");
    }

    #[test]
    fn test_decode_bind() {
        let event = Event::decode(&header(0x8, 17), b"tcp://127.0.0.1:5555").unwrap();
        assert_eq!(event.kind, EventType::Bind);
        assert_eq!(event.address, "tcp://127.0.0.1:5555");
        assert_eq!(event.detail, EventDetail::None);
        assert!(event.error().is_none());
        assert_eq!(event.to_string(), "bind tcp://127.0.0.1:5555");
    }

    #[test]
    fn test_decode_value_interpretation() {
        let retry = Event::decode(&header(0x4, 250), b"tcp://host:1").unwrap();
        assert_eq!(retry.detail, EventDetail::RetryInterval(250));

        let failed = Event::decode(&header(0x10, libc::EADDRINUSE as u32), b"tcp://*:1").unwrap();
        let err = failed.error().unwrap();
        assert_eq!(err.code(), "EADDRINUSE");
        assert_eq!(err.address(), Some("tcp://*:1"));

        let protocol = Event::decode(&header(0x2000, 0x1000_0001), b"").unwrap();
        match protocol.error().unwrap() {
            Error::Protocol(p) => assert_eq!(p.code(), "ERR_ZMTP_UNEXPECTED_COMMAND"),
            other => panic!("unexpected {other:?}"),
        }

        let auth = Event::decode(&header(0x4000, 400), b"").unwrap();
        match auth.error().unwrap() {
            Error::Auth(a) => assert_eq!(a.message(), "Authentication failure"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_end_is_terminal() {
        let event = Event::decode(&header(0x400, 0), b"").unwrap();
        assert!(event.is_terminal());
        assert!(event.address.is_empty());
    }

    #[test]
    fn test_short_header_is_rejected() {
        let err = Event::decode(&[1, 0, 0], b"").unwrap_err();
        assert_eq!(err.code(), "EPROTO");
    }
}
