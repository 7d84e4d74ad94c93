//! Outgoing multipart messages.
//!
//! Every send takes a [`Message`]: an ordered list of frames, each becoming
//! one part on the wire. Most callers never build one by hand, since
//! anything that converts into a single frame (`&str`, `String`, `Vec<u8>`,
//! `Bytes`) or an array or iterator of them converts into a `Message`.
//!
//! ```
//! use zmqio_core::message_builder::Message;
//!
//! let single: Message = "hello".into();
//! assert_eq!(single.len(), 1);
//!
//! // ROUTER-style envelope: identity, delimiter, body.
//! let envelope = Message::new()
//!     .push(&b"client-7"[..])
//!     .push_empty()
//!     .push_str("ready");
//! assert_eq!(envelope.len(), 3);
//! ```

use bytes::Bytes;

/// Frames of one outgoing message, in send order.
///
/// An empty `Message` is sent as a single empty part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    frames: Vec<Bytes>,
}

impl Message {
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Appends a frame.
    #[must_use]
    pub fn push(mut self, frame: impl Into<Bytes>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Appends a copy of `text`.
    #[must_use]
    pub fn push_str(self, text: &str) -> Self {
        self.push(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Appends a zero-length delimiter frame.
    #[must_use]
    pub fn push_empty(self) -> Self {
        self.push(Bytes::new())
    }

    /// Appends `value` as 4 big-endian bytes.
    #[must_use]
    pub fn push_u32(self, value: u32) -> Self {
        self.push(Bytes::copy_from_slice(&value.to_be_bytes()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn frames(&self) -> &[Bytes] {
        &self.frames
    }

    #[must_use]
    pub fn into_frames(self) -> Vec<Bytes> {
        self.frames
    }
}

impl From<Vec<Bytes>> for Message {
    fn from(frames: Vec<Bytes>) -> Self {
        Self { frames }
    }
}

macro_rules! single_frame {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Message {
            fn from(frame: $ty) -> Self {
                Self { frames: vec![Bytes::from(frame)] }
            }
        }
    )*};
}

single_frame!(Bytes, Vec<u8>, String);

impl From<&str> for Message {
    fn from(frame: &str) -> Self {
        Self::new().push_str(frame)
    }
}

impl From<&[u8]> for Message {
    fn from(frame: &[u8]) -> Self {
        Self::new().push(Bytes::copy_from_slice(frame))
    }
}

impl<T: Into<Bytes>, const N: usize> From<[T; N]> for Message {
    fn from(frames: [T; N]) -> Self {
        frames.into_iter().collect()
    }
}

impl<T: Into<Bytes>> FromIterator<T> for Message {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<Message> for Vec<Bytes> {
    fn from(message: Message) -> Self {
        message.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_keeps_order() {
        let frames = Message::new()
            .push_str("topic")
            .push_empty()
            .push(vec![1_u8, 2])
            .push_u32(0x0102_0304)
            .into_frames();

        assert_eq!(frames.len(), 4);
        assert_eq!(&frames[0][..], b"topic");
        assert!(frames[1].is_empty());
        assert_eq!(&frames[2][..], &[1, 2]);
        assert_eq!(&frames[3][..], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_single_frame_conversions() {
        let msg: Message = "hello".into();
        assert_eq!(msg.frames(), &[Bytes::from_static(b"hello")]);

        let msg: Message = vec![0_u8; 200].into();
        assert_eq!(msg.frames()[0].len(), 200);

        let msg: Message = String::from("owned").into();
        assert_eq!(&msg.frames()[0][..], b"owned");

        let msg: Message = (&b"raw"[..]).into();
        assert_eq!(msg.len(), 1);
    }

    #[test]
    fn test_array_conversion_keeps_empty_frames() {
        let msg: Message = ["first", "", "last"].into();
        let frames: Vec<Bytes> = msg.into();
        assert_eq!(frames.len(), 3);
        assert!(frames[1].is_empty());
        assert_eq!(&frames[2][..], b"last");
    }

    #[test]
    fn test_collect_from_iterator() {
        let msg: Message = (0..3_u8).map(|i| vec![i]).collect();
        assert_eq!(msg.len(), 3);
        assert!(Message::new().is_empty());
    }
}
