//! Wire message ownership.
//!
//! [`OutgoingMsg`] and [`IncomingMsg`] own a single message part and decide
//! how its bytes cross the boundary with libzmq:
//!
//! - Parts of at most [`ZERO_COPY_THRESHOLD`] bytes are copied. Copying a
//!   small part is cheaper than arranging for its release later.
//! - Larger outgoing parts are lent to libzmq without copying. libzmq hands
//!   them back from one of its I/O threads once transmitted; the release
//!   callback only moves the buffer into a [`Trash`], and the owning thread
//!   drops it from there.
//! - Larger incoming parts are exposed as a [`Bytes`] view over the native
//!   message. Dropping the last view closes the native message.
//!
//! Zero-copy incoming views are accounted in [`external_memory`].

// Zero-copy hand-off across the FFI boundary.
#![allow(unsafe_code)]

use crate::error::{Error, Result};
use crate::message_builder::Message;
use crate::transport::{Handle, RawMsg, DONTWAIT, SNDMORE};
use crate::trash::Trash;
use bytes::Bytes;
use smallvec::SmallVec;
use std::ffi::c_void;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Parts up to this size are copied in both directions.
pub const ZERO_COPY_THRESHOLD: usize = 1 << 7;

static EXTERNAL_MEMORY: AtomicI64 = AtomicI64::new(0);

/// Bytes currently held by zero-copy incoming views.
#[must_use]
pub fn external_memory() -> i64 {
    EXTERNAL_MEMORY.load(Ordering::Relaxed)
}

fn adjust_external_memory(delta: i64) {
    EXTERNAL_MEMORY.fetch_add(delta, Ordering::Relaxed);
}

/// A buffer lent to libzmq, and where to return it.
struct Lease {
    payload: Bytes,
    trash: Arc<Trash<Bytes>>,
}

/// Runs on a libzmq I/O thread.
extern "C" fn release_lease(_data: *mut c_void, hint: *mut c_void) {
    // SAFETY: hint is the Box<Lease> leaked in OutgoingMsg::new, and libzmq
    // calls this exactly once.
    let lease = unsafe { Box::from_raw(hint.cast::<Lease>()) };
    let Lease { payload, trash } = *lease;
    trash.add(payload);
}

/// One message part pending send.
pub struct OutgoingMsg {
    raw: RawMsg,
}

impl OutgoingMsg {
    /// Wraps `payload`, copying it when small and lending it otherwise.
    ///
    /// # Errors
    ///
    /// The native error if libzmq cannot initialise the message.
    pub fn new(payload: Bytes, trash: &Arc<Trash<Bytes>>) -> Result<Self> {
        if payload.len() <= ZERO_COPY_THRESHOLD {
            return Ok(Self {
                raw: RawMsg::copy_from(&payload)?,
            });
        }

        let (data, len) = (payload.as_ptr(), payload.len());
        let lease = Box::into_raw(Box::new(Lease {
            payload,
            trash: Arc::clone(trash),
        }));
        // SAFETY: the lease keeps `data` alive and immutable until
        // release_lease runs; Bytes is Send so release may run anywhere.
        match unsafe { RawMsg::borrowed(data, len, release_lease, lease.cast()) } {
            Ok(raw) => Ok(Self { raw }),
            Err(err) => {
                // SAFETY: libzmq did not take the lease.
                drop(unsafe { Box::from_raw(lease) });
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn raw_mut(&mut self) -> &mut RawMsg {
        &mut self.raw
    }
}

/// All parts of one outgoing message, in order.
pub struct Parts {
    parts: SmallVec<[OutgoingMsg; 4]>,
}

impl Parts {
    /// Prepares every frame of `message`. An empty message becomes a
    /// single empty part.
    ///
    /// # Errors
    ///
    /// The native error of the first part that cannot be initialised.
    pub fn new(message: Message, trash: &Arc<Trash<Bytes>>) -> Result<Self> {
        let frames = message.into_frames();
        let mut parts = SmallVec::with_capacity(frames.len().max(1));
        for frame in frames {
            parts.push(OutgoingMsg::new(frame, trash)?);
        }
        if parts.is_empty() {
            parts.push(OutgoingMsg::new(Bytes::new(), trash)?);
        }
        Ok(Self { parts })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut OutgoingMsg> {
        self.parts.iter_mut()
    }

    /// Sends every part without blocking, all but the last flagged "more".
    /// Stops at the first failure.
    ///
    /// # Errors
    ///
    /// The native error of the failing part (`EAGAIN` when the socket
    /// cannot accept the message right now).
    pub fn send(&mut self, handle: &mut Handle) -> Result<()> {
        let last = self.parts.len().saturating_sub(1);
        for (index, part) in self.parts.iter_mut().enumerate() {
            let flags = if index == last { DONTWAIT } else { DONTWAIT | SNDMORE };
            handle.send(part.raw_mut(), flags).map_err(Error::native)?;
        }
        Ok(())
    }
}

/// Native message backing a zero-copy incoming view.
struct NativeBuffer {
    raw: RawMsg,
    len: usize,
}

impl AsRef<[u8]> for NativeBuffer {
    fn as_ref(&self) -> &[u8] {
        self.raw.data()
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        adjust_external_memory(-(self.len as i64));
    }
}

/// One received message part.
pub struct IncomingMsg {
    raw: RawMsg,
}

impl IncomingMsg {
    /// Receives the next part without blocking.
    ///
    /// # Errors
    ///
    /// `EAGAIN` if nothing is queued, or the native error.
    pub fn recv(handle: &mut Handle) -> Result<Self> {
        let mut raw = RawMsg::new();
        handle.recv(&mut raw, DONTWAIT).map_err(Error::native)?;
        Ok(Self { raw })
    }

    /// True if more parts of the same message follow.
    #[must_use]
    pub fn more(&self) -> bool {
        self.raw.more()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Native message, for reading metadata such as routing ids.
    #[must_use]
    pub fn raw(&self) -> &RawMsg {
        &self.raw
    }

    /// Exposes the bytes: copied when small, a zero-copy view otherwise.
    /// An empty part becomes an empty buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        let len = self.raw.len();
        if len == 0 {
            return Bytes::new();
        }
        if len <= ZERO_COPY_THRESHOLD {
            return Bytes::copy_from_slice(self.raw.data());
        }
        adjust_external_memory(len as i64);
        Bytes::from_owner(NativeBuffer { raw: self.raw, len })
    }
}

impl From<RawMsg> for IncomingMsg {
    fn from(raw: RawMsg) -> Self {
        Self { raw }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trash() -> Arc<Trash<Bytes>> {
        Arc::new(Trash::new())
    }

    #[test]
    fn test_small_payload_is_copied() {
        let trash = trash();
        let payload = Bytes::from(vec![7_u8; ZERO_COPY_THRESHOLD]);
        let msg = OutgoingMsg::new(payload.clone(), &trash).unwrap();
        assert_eq!(msg.len(), ZERO_COPY_THRESHOLD);
        drop(msg);
        assert!(trash.is_empty());
    }

    #[test]
    fn test_large_payload_returns_to_trash() {
        let trash = trash();
        let payload = Bytes::from(vec![7_u8; ZERO_COPY_THRESHOLD + 1]);
        let msg = OutgoingMsg::new(payload, &trash).unwrap();
        assert_eq!(msg.len(), ZERO_COPY_THRESHOLD + 1);
        // Never sent: closing the message releases the lease.
        drop(msg);
        assert_eq!(trash.len(), 1);
        assert_eq!(trash.clear(), 1);
    }

    #[test]
    fn test_empty_message_is_one_part() {
        let parts = Parts::new(Message::new(), &trash()).unwrap();
        assert_eq!(parts.len(), 1);

        let parts = Parts::new(Message::from(["a", "b", "c"]), &trash()).unwrap();
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_incoming_copy_and_view() {
        let small = IncomingMsg::from(RawMsg::copy_from(b"hello").unwrap()).into_bytes();
        assert_eq!(&small[..], b"hello");

        let empty = IncomingMsg::from(RawMsg::new()).into_bytes();
        assert!(empty.is_empty());

        let data = vec![3_u8; 4096];
        let before = external_memory();
        let view = IncomingMsg::from(RawMsg::copy_from(&data).unwrap()).into_bytes();
        assert_eq!(&view[..], &data[..]);
        assert!(external_memory() >= before + 4096);
        let clone = view.clone();
        drop(view);
        assert_eq!(clone.len(), 4096);
        drop(clone);
    }
}
