//! Socket type enumeration for ZeroMQ socket types.
//!
//! Values match the `ZMQ_*` socket type constants passed to `zmq_socket`.

use std::fmt;

/// ZeroMQ socket types.
///
/// Corresponds to ZMQ_TYPE socket option (16).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SocketType {
    /// PAIR socket for exclusive bidirectional communication
    Pair = 0,

    /// PUB socket for publishing messages to subscribers
    Pub = 1,

    /// SUB socket for subscribing to published messages
    Sub = 2,

    /// REQ socket for synchronous request-reply client
    Req = 3,

    /// REP socket for synchronous request-reply server
    Rep = 4,

    /// DEALER socket for asynchronous request-reply patterns
    Dealer = 5,

    /// ROUTER socket for routing messages by identity
    Router = 6,

    /// PULL socket for receiving messages from pushers
    Pull = 7,

    /// PUSH socket for sending messages to pullers
    Push = 8,

    /// XPUB socket for extended publisher with subscription awareness
    XPub = 9,

    /// XSUB socket for extended subscriber with dynamic subscriptions
    XSub = 10,

    /// STREAM socket for raw TCP connections
    Stream = 11,

    /// SERVER socket (draft), replies addressed by routing id
    Server = 12,

    /// CLIENT socket (draft)
    Client = 13,

    /// RADIO socket (draft), group-addressed publisher
    Radio = 14,

    /// DISH socket (draft), group-joining subscriber
    Dish = 15,

    /// GATHER socket (draft)
    Gather = 16,

    /// SCATTER socket (draft)
    Scatter = 17,

    /// DGRAM socket (draft), UDP datagrams
    Dgram = 18,

    /// PEER socket (draft)
    Peer = 19,

    /// CHANNEL socket (draft)
    Channel = 20,
}

impl SocketType {
    /// Get the socket type as a string name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pair => "PAIR",
            Self::Pub => "PUB",
            Self::Sub => "SUB",
            Self::Req => "REQ",
            Self::Rep => "REP",
            Self::Dealer => "DEALER",
            Self::Router => "ROUTER",
            Self::Pull => "PULL",
            Self::Push => "PUSH",
            Self::XPub => "XPUB",
            Self::XSub => "XSUB",
            Self::Stream => "STREAM",
            Self::Server => "SERVER",
            Self::Client => "CLIENT",
            Self::Radio => "RADIO",
            Self::Dish => "DISH",
            Self::Gather => "GATHER",
            Self::Scatter => "SCATTER",
            Self::Dgram => "DGRAM",
            Self::Peer => "PEER",
            Self::Channel => "CHANNEL",
        }
    }

    /// Native `ZMQ_*` value.
    #[must_use]
    pub const fn raw(self) -> i32 {
        self as i32
    }

    /// Socket type from its native value, as read back from `ZMQ_TYPE`.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::Pair,
            1 => Self::Pub,
            2 => Self::Sub,
            3 => Self::Req,
            4 => Self::Rep,
            5 => Self::Dealer,
            6 => Self::Router,
            7 => Self::Pull,
            8 => Self::Push,
            9 => Self::XPub,
            10 => Self::XSub,
            11 => Self::Stream,
            12 => Self::Server,
            13 => Self::Client,
            14 => Self::Radio,
            15 => Self::Dish,
            16 => Self::Gather,
            17 => Self::Scatter,
            18 => Self::Dgram,
            19 => Self::Peer,
            20 => Self::Channel,
            _ => return None,
        })
    }

    /// Draft socket types only exist in libzmq builds with the draft API.
    #[must_use]
    pub const fn is_draft(self) -> bool {
        self as i32 >= Self::Server as i32
    }

    /// Types that address each outgoing message to a routing id.
    #[must_use]
    pub const fn is_addressable(self) -> bool {
        matches!(self, Self::Server | Self::Peer)
    }

    /// Types whose messages carry a group name.
    #[must_use]
    pub const fn is_grouped(self) -> bool {
        matches!(self, Self::Radio | Self::Dish)
    }

    /// ROUTER-like types accept a routing id when connecting.
    #[must_use]
    pub const fn accepts_connect_routing_id(self) -> bool {
        matches!(self, Self::Router | Self::Stream | Self::Peer)
    }

    /// Check if this socket type is compatible with the given peer type.
    #[must_use]
    pub fn is_compatible(&self, peer: SocketType) -> bool {
        matches!(
            (self, peer),
            (Self::Pair, Self::Pair)
                | (Self::Pub, Self::Sub | Self::XSub)
                | (Self::Sub, Self::Pub | Self::XPub)
                | (Self::Req, Self::Rep | Self::Router)
                | (Self::Rep, Self::Req | Self::Dealer)
                | (Self::Router, Self::Req | Self::Dealer | Self::Router)
                | (Self::Dealer, Self::Rep | Self::Router | Self::Dealer)
                | (Self::Push, Self::Pull)
                | (Self::Pull, Self::Push)
                | (Self::XPub, Self::XSub | Self::Sub)
                | (Self::XSub, Self::XPub | Self::Pub)
                | (Self::Server, Self::Client)
                | (Self::Client, Self::Server)
                | (Self::Radio, Self::Dish)
                | (Self::Dish, Self::Radio)
                | (Self::Scatter, Self::Gather)
                | (Self::Gather, Self::Scatter)
                | (Self::Peer, Self::Peer)
                | (Self::Channel, Self::Channel)
                | (Self::Dgram, Self::Dgram)
        )
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
