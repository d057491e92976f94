use std::fmt;
use std::ops::Deref;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Shortest possible frame: command, attribute, one data byte.
pub const MIN_FRAME_LEN: usize = 3;

/// Longest possible frame: the attribute nibble tops out at 15.
pub const MAX_FRAME_LEN: usize = 18;

/// One Seatalk1 datagram.
///
/// ```text
/// ┌──────────┬──────────────────────┬──────────────────────┐
/// │ Command  │ Attribute            │ Data                 │
/// │ (1B)     │ hi: aux, lo: len - 3 │ (1..=16 B)           │
/// └──────────┴──────────────────────┴──────────────────────┘
/// ```
///
/// Frames produced by the assembler always agree with their attribute nibble.
/// Frames built with [`Frame::new`] only need a valid length; consumers that
/// care about the nibble check [`Frame::declared_len`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Wrap raw frame bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&bytes.len()) {
            return Err(FrameError::InvalidLength { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    /// Build a frame from a command byte, the auxiliary (high) attribute
    /// nibble and the data bytes. The length nibble is filled in.
    pub fn build(command: u8, aux: u8, data: &[u8]) -> Result<Self> {
        let len = data.len() + 2;
        if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&len) {
            return Err(FrameError::InvalidLength { len });
        }
        let mut buf = BytesMut::with_capacity(len);
        buf.put_u8(command);
        buf.put_u8(((aux & 0x0F) << 4) | (data.len() as u8 - 1));
        buf.put_slice(data);
        Ok(Self {
            bytes: buf.freeze(),
        })
    }

    /// The command byte.
    pub fn command(&self) -> u8 {
        self.bytes[0]
    }

    /// The full attribute byte.
    pub fn attribute(&self) -> u8 {
        self.bytes[1]
    }

    /// High nibble of the attribute byte.
    pub fn aux_nibble(&self) -> u8 {
        self.bytes[1] >> 4
    }

    /// Length implied by the attribute nibble.
    pub fn declared_len(&self) -> usize {
        usize::from(self.bytes[1] & 0x0F) + MIN_FRAME_LEN
    }

    /// Whether the attribute nibble agrees with the actual length.
    pub fn is_length_consistent(&self) -> bool {
        self.declared_len() == self.bytes.len()
    }

    /// The raw frame bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bytes after the attribute byte.
    pub fn data(&self) -> &[u8] {
        &self.bytes[2..]
    }

    /// Consume the frame and return its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = FrameError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Frame::new(Bytes::copy_from_slice(bytes))
    }
}

impl TryFrom<Vec<u8>> for Frame {
    type Error = FrameError;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Frame::new(bytes)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.bytes.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame[{self}]")
    }
}

/// Append a frame to an output buffer.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(frame.len());
    dst.put_slice(frame.as_bytes());
}

/// Assemble a frame from the front of a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete frame yet. On
/// success the frame bytes are consumed from the buffer. Every attribute
/// nibble yields a legal length, so any two leading bytes start a frame;
/// whether that frame means anything is decided later.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    let Some(total) = pending_frame_len(src) else {
        return Ok(None);
    };
    if src.len() < total {
        return Ok(None);
    }
    let bytes = src.split_to(total).freeze();
    Ok(Some(Frame { bytes }))
}

/// Total length of the frame starting at the front of `src`, once the
/// attribute byte is available.
pub(crate) fn pending_frame_len(src: &[u8]) -> Option<usize> {
    let attribute = *src.get(1)?;
    Some(usize::from(attribute & 0x0F) + MIN_FRAME_LEN)
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone, Default)]
pub struct FrameConfig {
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}
