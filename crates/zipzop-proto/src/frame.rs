//! Message frames.
//!
//! A frame carries one chat line and the name of whoever said it:
//!
//! ```text
//! content bytes | 0x00 | sender bytes | 0x00
//! ```
//!
//! There is no length prefix. Neither field may contain the terminator, so a
//! frame ends exactly at its second NUL and is self-delimiting on a stream.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Field, ProtocolError, Result};

/// Byte that terminates each field of a frame.
pub const TERMINATOR: u8 = 0;

/// A decoded message: what was said and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
    /// Message body.
    pub content: String,
    /// Name of the author.
    pub sender: String,
}

impl Frame {
    /// Create a frame from a sender name and message content.
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: sender.into(),
        }
    }

    /// Encode this frame into its wire form.
    pub fn encode(&self) -> Result<EncodedFrame> {
        encode(&self.sender, &self.content)
    }

    /// Exact number of bytes this frame occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        self.content.len() + self.sender.len() + 2
    }
}

/// Renders as `sender: content`, the way clients print broadcasts.
impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.content)
    }
}

/// An immutable, encoded frame.
///
/// Cloning is a reference-count bump, so one encoding can be handed to every
/// recipient of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame(Bytes);

impl EncodedFrame {
    /// Wire bytes of the frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the frame on the wire.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a frame produced by [`encode`]; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the frame, returning the shared buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Decode the wire bytes back into a [`Frame`].
    pub fn decode(&self) -> Result<Frame> {
        decode(&self.0)
    }
}

impl AsRef<[u8]> for EncodedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encode `content` said by `sender` into a single buffer.
///
/// Fails if either string contains [`TERMINATOR`], since such a value cannot
/// be represented on the wire.
pub fn encode(sender: &str, content: &str) -> Result<EncodedFrame> {
    check_field(content, Field::Content)?;
    check_field(sender, Field::Sender)?;

    let mut buf = BytesMut::with_capacity(content.len() + sender.len() + 2);
    buf.put_slice(content.as_bytes());
    buf.put_u8(TERMINATOR);
    buf.put_slice(sender.as_bytes());
    buf.put_u8(TERMINATOR);
    Ok(EncodedFrame(buf.freeze()))
}

/// Decode exactly one frame from `buf`.
///
/// The first terminator ends the content, the second ends the sender. A
/// missing terminator, bytes after the second terminator, or a field that is
/// not UTF-8 is an error.
pub fn decode(buf: &[u8]) -> Result<Frame> {
    let (content, rest) = split_field(buf, Field::Content)?;
    let (sender, rest) = split_field(rest, Field::Sender)?;
    if !rest.is_empty() {
        return Err(ProtocolError::TrailingBytes { count: rest.len() });
    }

    Ok(Frame {
        content: to_string(content, Field::Content)?,
        sender: to_string(sender, Field::Sender)?,
    })
}

fn check_field(value: &str, field: Field) -> Result<()> {
    if value.as_bytes().contains(&TERMINATOR) {
        return Err(ProtocolError::EmbeddedTerminator { field });
    }
    Ok(())
}

fn split_field(buf: &[u8], field: Field) -> Result<(&[u8], &[u8])> {
    match buf.iter().position(|b| *b == TERMINATOR) {
        Some(pos) => Ok((&buf[..pos], &buf[pos + 1..])),
        None => Err(ProtocolError::MissingTerminator { field }),
    }
}

fn to_string(bytes: &[u8], field: Field) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ProtocolError::utf8(field, e))
}
