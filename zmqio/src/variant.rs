//! Per-pattern message metadata.
//!
//! Most socket types send and receive plain multipart messages. The draft
//! SERVER/PEER types address each message by routing id, and RADIO/DISH
//! attach a group name. A [`Variant`] captures what a socket type adds to
//! each send ([`Variant::Route`]) and each receive ([`Variant::Meta`]).

use std::ops::Deref;
use zmqio_core::error::{Error, Result};
use zmqio_core::message::{IncomingMsg, OutgoingMsg};
use zmqio_core::socket_type::SocketType;
use bytes::Bytes;

/// Metadata policy of a socket pattern.
pub trait Variant: 'static {
    /// Extra value every send takes.
    type Route;
    /// Extra value every receive yields.
    type Meta;

    /// Whether sockets of `kind` use this variant.
    fn accepts(kind: SocketType) -> bool;

    /// Attaches `route` to an outgoing part.
    ///
    /// # Errors
    ///
    /// The native error if libzmq rejects the metadata.
    fn stamp(route: &Self::Route, part: &mut OutgoingMsg) -> Result<()>;

    /// Reads the metadata of the first received part.
    fn meta(first: &IncomingMsg) -> Self::Meta;
}

/// Plain multipart sockets.
#[derive(Debug, Clone, Copy)]
pub enum Basic {}

impl Variant for Basic {
    type Route = ();
    type Meta = ();

    fn accepts(kind: SocketType) -> bool {
        !kind.is_addressable() && !kind.is_grouped()
    }

    fn stamp((): &(), _part: &mut OutgoingMsg) -> Result<()> {
        Ok(())
    }

    fn meta(_first: &IncomingMsg) {}
}

/// SERVER and PEER sockets: every message carries a routing id.
#[cfg(feature = "draft")]
#[derive(Debug, Clone, Copy)]
pub enum Addressable {}

#[cfg(feature = "draft")]
impl Variant for Addressable {
    type Route = u32;
    type Meta = u32;

    fn accepts(kind: SocketType) -> bool {
        kind.is_addressable()
    }

    fn stamp(routing_id: &u32, part: &mut OutgoingMsg) -> Result<()> {
        part.raw_mut().set_routing_id(*routing_id)
    }

    fn meta(first: &IncomingMsg) -> u32 {
        first.raw().routing_id()
    }
}

/// RADIO and DISH sockets: every message belongs to a group.
#[cfg(feature = "draft")]
#[derive(Debug, Clone, Copy)]
pub enum Grouped {}

#[cfg(feature = "draft")]
impl Variant for Grouped {
    type Route = String;
    type Meta = String;

    fn accepts(kind: SocketType) -> bool {
        kind.is_grouped()
    }

    fn stamp(group: &String, part: &mut OutgoingMsg) -> Result<()> {
        part.raw_mut().set_group(group)
    }

    fn meta(first: &IncomingMsg) -> String {
        first.raw().group()
    }
}

pub(crate) fn check_kind<V: Variant>(kind: SocketType) -> Result<()> {
    if V::accepts(kind) {
        Ok(())
    } else {
        Err(Error::argument(format!(
            "Socket type {kind} is not supported by this socket variant"
        )))
    }
}

/// One received message: its parts plus per-pattern metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Received<M = ()> {
    parts: Vec<Bytes>,
    meta: M,
}

impl<M> Received<M> {
    pub(crate) fn new(parts: Vec<Bytes>, meta: M) -> Self {
        Self { parts, meta }
    }

    /// Routing id or group, depending on the variant.
    pub fn meta(&self) -> &M {
        &self.meta
    }

    #[must_use]
    pub fn into_parts(self) -> Vec<Bytes> {
        self.parts
    }

    #[must_use]
    pub fn into_inner(self) -> (Vec<Bytes>, M) {
        (self.parts, self.meta)
    }
}

impl<M> Deref for Received<M> {
    type Target = [Bytes];

    fn deref(&self) -> &[Bytes] {
        &self.parts
    }
}

impl<M> IntoIterator for Received<M> {
    type Item = Bytes;
    type IntoIter = std::vec::IntoIter<Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}

impl<M> From<Received<M>> for Vec<Bytes> {
    fn from(received: Received<M>) -> Self {
        received.parts
    }
}
