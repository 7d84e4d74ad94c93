//! zmqio error types.
//!
//! Every failure a caller can observe is one [`Error`]. Argument, busy and
//! closed errors are raised before any native call is attempted; native
//! errors carry the libzmq `errno` and, for address operations, the
//! offending address.

// zmq_errno / zmq_strerror.
#![allow(unsafe_code)]

use std::borrow::Cow;
use std::ffi::CStr;
use std::fmt;
use std::io;
use thiserror::Error;

/// Base value libzmq adds to its own error numbers.
const HAUSNUMERO: i32 = 156_384_712;

/// Native error number as reported by `zmq_errno()`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Errno(pub i32);

impl Errno {
    pub const EAGAIN: Self = Self(libc::EAGAIN);
    pub const EINTR: Self = Self(libc::EINTR);
    pub const EINVAL: Self = Self(libc::EINVAL);
    pub const EFAULT: Self = Self(libc::EFAULT);
    pub const EBADF: Self = Self(libc::EBADF);
    pub const EBUSY: Self = Self(libc::EBUSY);
    pub const EMFILE: Self = Self(libc::EMFILE);
    pub const ENOENT: Self = Self(libc::ENOENT);
    pub const EADDRINUSE: Self = Self(libc::EADDRINUSE);
    pub const EPROTO: Self = Self(libc::EPROTO);
    pub const EFSM: Self = Self(HAUSNUMERO + 51);
    pub const ENOCOMPATPROTO: Self = Self(HAUSNUMERO + 52);
    pub const ETERM: Self = Self(HAUSNUMERO + 53);
    pub const EMTHREAD: Self = Self(HAUSNUMERO + 54);

    /// Reads the calling thread's last libzmq error.
    #[must_use]
    pub fn last() -> Self {
        // SAFETY: zmq_errno only reads thread-local state.
        Self(unsafe { zmq_sys::zmq_errno() })
    }

    /// Raw error number.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Symbolic name, e.g. `"EADDRINUSE"`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self.0 {
            libc::EAGAIN => "EAGAIN",
            libc::EINTR => "EINTR",
            libc::EINVAL => "EINVAL",
            libc::EFAULT => "EFAULT",
            libc::EBADF => "EBADF",
            libc::EBUSY => "EBUSY",
            libc::EMFILE => "EMFILE",
            libc::ENOENT => "ENOENT",
            libc::ENOMEM => "ENOMEM",
            libc::EACCES => "EACCES",
            libc::ENODEV => "ENODEV",
            libc::EPROTO => "EPROTO",
            libc::ENOTSUP => "ENOTSUP",
            libc::EPROTONOSUPPORT => "EPROTONOSUPPORT",
            libc::ENOBUFS => "ENOBUFS",
            libc::ENETDOWN => "ENETDOWN",
            libc::EADDRINUSE => "EADDRINUSE",
            libc::EADDRNOTAVAIL => "EADDRNOTAVAIL",
            libc::ECONNREFUSED => "ECONNREFUSED",
            libc::EINPROGRESS => "EINPROGRESS",
            libc::ENOTSOCK => "ENOTSOCK",
            libc::EMSGSIZE => "EMSGSIZE",
            libc::EAFNOSUPPORT => "EAFNOSUPPORT",
            libc::ENETUNREACH => "ENETUNREACH",
            libc::ECONNABORTED => "ECONNABORTED",
            libc::ECONNRESET => "ECONNRESET",
            libc::ENOTCONN => "ENOTCONN",
            libc::ETIMEDOUT => "ETIMEDOUT",
            libc::EHOSTUNREACH => "EHOSTUNREACH",
            libc::ENETRESET => "ENETRESET",
            n if n == Self::EFSM.0 => "EFSM",
            n if n == Self::ENOCOMPATPROTO.0 => "ENOCOMPATPROTO",
            n if n == Self::ETERM.0 => "ETERM",
            n if n == Self::EMTHREAD.0 => "EMTHREAD",
            _ => "UNKNOWN",
        }
    }

    /// Human readable message. The most common codes get clearer wording
    /// than libzmq's own strings.
    #[must_use]
    pub fn message(self) -> Cow<'static, str> {
        match self.0 {
            libc::EFAULT => "Context is closed".into(),
            libc::EAGAIN => "Operation was not possible or timed out".into(),
            libc::EMFILE => "Too many open file descriptors".into(),
            libc::ENOENT => "No such endpoint".into(),
            libc::EBUSY => "Socket is busy".into(),
            libc::EBADF => "Socket is closed".into(),
            libc::EADDRINUSE => "Address already in use".into(),
            n => {
                // SAFETY: zmq_strerror returns a static NUL-terminated string.
                let text = unsafe { CStr::from_ptr(zmq_sys::zmq_strerror(n)) };
                Cow::Owned(text.to_string_lossy().into_owned())
            }
        }
    }
}

impl fmt::Debug for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.code(), self.0)
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// ZMTP/ZAP handshake failure reported through an observer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolError {
    code: u32,
}

impl ProtocolError {
    #[must_use]
    pub const fn new(code: u32) -> Self {
        Self { code }
    }

    /// Raw libzmq protocol error value.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.code
    }

    /// Symbolic code, e.g. `"ERR_ZMTP_MALFORMED_COMMAND_HELLO"`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self.code {
            0x1000_0000 => "ERR_ZMTP_UNSPECIFIED",
            0x1000_0001 => "ERR_ZMTP_UNEXPECTED_COMMAND",
            0x1000_0002 => "ERR_ZMTP_INVALID_SEQUENCE",
            0x1000_0003 => "ERR_ZMTP_KEY_EXCHANGE",
            0x1000_0011 => "ERR_ZMTP_MALFORMED_COMMAND_UNSPECIFIED",
            0x1000_0012 => "ERR_ZMTP_MALFORMED_COMMAND_MESSAGE",
            0x1000_0013 => "ERR_ZMTP_MALFORMED_COMMAND_HELLO",
            0x1000_0014 => "ERR_ZMTP_MALFORMED_COMMAND_INITIATE",
            0x1000_0015 => "ERR_ZMTP_MALFORMED_COMMAND_ERROR",
            0x1000_0016 => "ERR_ZMTP_MALFORMED_COMMAND_READY",
            0x1000_0017 => "ERR_ZMTP_MALFORMED_COMMAND_WELCOME",
            0x1000_0018 => "ERR_ZMTP_INVALID_METADATA",
            0x1100_0001 => "ERR_ZMTP_CRYPTOGRAPHIC",
            0x1100_0002 => "ERR_ZMTP_MECHANISM_MISMATCH",
            0x2000_0000 => "ERR_ZAP_UNSPECIFIED",
            0x2000_0001 => "ERR_ZAP_MALFORMED_REPLY",
            0x2000_0002 => "ERR_ZAP_BAD_REQUEST_ID",
            0x2000_0003 => "ERR_ZAP_BAD_VERSION",
            0x2000_0004 => "ERR_ZAP_INVALID_STATUS_CODE",
            0x2000_0005 => "ERR_ZAP_INVALID_METADATA",
            _ => "ERR_UNKNOWN",
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self.code >> 24 {
            0x10 => "ZMTP protocol error",
            0x11 => "ZMTP security error",
            0x20 => "ZAP protocol error",
            _ => "Unknown protocol error",
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// ZAP authentication failure status reported through an observer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthError {
    status: u32,
}

impl AuthError {
    #[must_use]
    pub const fn new(status: u32) -> Self {
        Self { status }
    }

    #[must_use]
    pub const fn status(&self) -> u32 {
        self.status
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self.status {
            300 => "Temporary error",
            400 => "Authentication failure",
            500 => "Internal error",
            _ => "Unknown error",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message(), self.status)
    }
}

/// Main error type for zmqio operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Malformed call: unknown option kind, bad identifier, invalid address
    #[error("{0}")]
    Argument(String),

    /// Another operation already owns this direction, or the socket is
    /// blocked by a bind/unbind
    #[error("{0}")]
    Busy(&'static str),

    /// Operation on a closed socket or observer
    #[error("Socket is closed")]
    Closed,

    /// libzmq call failed
    #[error("{errno}")]
    Native { errno: Errno, address: Option<String> },

    /// Handshake failed with a ZMTP/ZAP protocol error
    #[error("{0}")]
    Protocol(ProtocolError),

    /// Handshake failed during ZAP authentication
    #[error("{0}")]
    Auth(AuthError),
}

/// Result type alias for zmqio operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an argument error with a message
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    #[must_use]
    pub const fn native(errno: Errno) -> Self {
        Self::Native { errno, address: None }
    }

    /// Native error for an address operation (bind, connect, ...).
    pub fn at(errno: Errno, address: impl Into<String>) -> Self {
        Self::Native {
            errno,
            address: Some(address.into()),
        }
    }

    /// Native error built from the calling thread's last libzmq error.
    #[must_use]
    pub fn last() -> Self {
        Self::native(Errno::last())
    }

    #[must_use]
    pub const fn blocked() -> Self {
        Self::Busy("Socket is blocked by a bind or unbind operation")
    }

    #[must_use]
    pub const fn busy_writing() -> Self {
        Self::Busy("Socket is busy writing; only one send operation may be in progress at any time")
    }

    #[must_use]
    pub const fn busy_reading() -> Self {
        Self::Busy("Socket is busy reading; only one receive operation may be in progress at any time")
    }

    #[must_use]
    pub const fn observer_busy() -> Self {
        Self::Busy("Observer is busy reading; only one receive operation may be in progress at any time")
    }

    /// Error number equivalent of this error, if it has one.
    #[must_use]
    pub const fn errno(&self) -> Option<Errno> {
        match self {
            Self::Busy(_) => Some(Errno::EBUSY),
            Self::Closed => Some(Errno::EBADF),
            Self::Native { errno, .. } => Some(*errno),
            Self::Argument(_) | Self::Protocol(_) | Self::Auth(_) => None,
        }
    }

    /// Symbolic code: an errno name, a protocol error name, or the kind.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Argument(_) => "EARGUMENT",
            Self::Protocol(err) => err.code(),
            Self::Auth(_) => "EAUTH",
            other => other.errno().map_or("UNKNOWN", Errno::code),
        }
    }

    /// Address the failing operation was given, if any.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Native { address, .. } => address.as_deref(),
            _ => None,
        }
    }

    /// True for "operation was not possible or timed out".
    #[must_use]
    pub fn is_again(&self) -> bool {
        self.errno() == Some(Errno::EAGAIN)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.errno() == Some(Errno::EBADF)
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }

    /// Check if retrying the same operation later can succeed
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Busy(_) => true,
            Self::Native { errno, .. } => matches!(
                *errno,
                Errno::EAGAIN | Errno::EINTR | Errno::EFSM
            ),
            _ => false,
        }
    }
}

impl From<Errno> for Error {
    fn from(errno: Errno) -> Self {
        Self::native(errno)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(raw) => Self::native(Errno(raw)),
            None => Self::Argument(err.to_string()),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err.errno() {
            Some(Errno::EAGAIN) => Self::new(io::ErrorKind::WouldBlock, err),
            Some(Errno::EADDRINUSE) => Self::new(io::ErrorKind::AddrInUse, err),
            Some(Errno::EBADF) => Self::new(io::ErrorKind::NotConnected, err),
            _ if matches!(err, Error::Argument(_)) => Self::new(io::ErrorKind::InvalidInput, err),
            _ => Self::new(io::ErrorKind::Other, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overridden_messages() {
        assert_eq!(Errno::EFAULT.message(), "Context is closed");
        assert_eq!(Errno::EADDRINUSE.message(), "Address already in use");
        assert_eq!(Errno::EMFILE.message(), "Too many open file descriptors");
        assert_eq!(Errno::EAGAIN.message(), "Operation was not possible or timed out");
    }

    #[test]
    fn test_library_messages() {
        assert!(!Errno::ETERM.message().is_empty());
        assert_eq!(Errno::ETERM.code(), "ETERM");
        assert_eq!(Errno::EFSM.code(), "EFSM");
        assert_eq!(Errno(-12345).code(), "UNKNOWN");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::Closed.code(), "EBADF");
        assert_eq!(Error::blocked().code(), "EBUSY");
        assert_eq!(Error::busy_reading().errno(), Some(Errno::EBUSY));
        assert_eq!(Error::argument("bad").errno(), None);
        assert_eq!(
            Error::Protocol(ProtocolError::new(0x1000_0013)).code(),
            "ERR_ZMTP_MALFORMED_COMMAND_HELLO"
        );
    }

    #[test]
    fn test_address_is_carried() {
        let err = Error::at(Errno::EADDRINUSE, "tcp://127.0.0.1:5555");
        assert_eq!(err.address(), Some("tcp://127.0.0.1:5555"));
        assert_eq!(err.to_string(), "Address already in use");
        assert!(Error::native(Errno::EAGAIN).address().is_none());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::native(Errno::EAGAIN).is_recoverable());
        assert!(Error::busy_writing().is_recoverable());
        assert!(!Error::Closed.is_recoverable());
        assert!(!Error::native(Errno::ETERM).is_recoverable());
    }

    #[test]
    fn test_protocol_and_auth_taxonomy() {
        assert_eq!(ProtocolError::new(0x1100_0001).message(), "ZMTP security error");
        assert_eq!(ProtocolError::new(0x2000_0003).message(), "ZAP protocol error");
        assert_eq!(ProtocolError::new(0x1000_0001).message(), "ZMTP protocol error");
        assert_eq!(AuthError::new(400).message(), "Authentication failure");
        assert_eq!(AuthError::new(300).message(), "Temporary error");
        assert_eq!(AuthError::new(500).message(), "Internal error");
        assert_eq!(AuthError::new(200).message(), "Unknown error");
    }

    #[test]
    fn test_io_conversion() {
        let io_err: io::Error = Error::native(Errno::EAGAIN).into();
        assert_eq!(io_err.kind(), io::ErrorKind::WouldBlock);

        let back = Error::from(io::Error::from_raw_os_error(libc::EMFILE));
        assert_eq!(back.errno(), Some(Errno::EMFILE));
    }
}
