//! Name introduction.
//!
//! The first bytes a client sends are its display name, ended by a NUL or a
//! newline. This is not a frame: there is no sender field. Anything received
//! after the terminator belongs to the frame stream and stays in the buffer.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, Field, ProtocolError};
use crate::frame::TERMINATOR;

/// Default upper bound on a declared name, in bytes.
pub const DEFAULT_MAX_NAME_LEN: usize = 32;

/// Codec for the one-shot name introduction.
#[derive(Debug, Clone)]
pub struct IntroductionCodec {
    next_index: usize,
    max_len: usize,
}

impl IntroductionCodec {
    /// Create a codec accepting names up to `max_len` bytes.
    pub fn new(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }
}

impl Default for IntroductionCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_NAME_LEN)
    }
}

fn is_name_terminator(b: u8) -> bool {
    b == TERMINATOR || b == b'\n'
}

/// Check that `name` can be sent as an introduction.
pub fn validate_name(name: &str, max_len: usize) -> error::Result<()> {
    if name.trim().is_empty() {
        return Err(ProtocolError::EmptyName);
    }
    if name.len() > max_len {
        return Err(ProtocolError::NameTooLong {
            actual: name.len(),
            limit: max_len,
        });
    }
    if let Some(b) = name.bytes().find(|b| is_name_terminator(*b) || *b == b'\r') {
        return Err(ProtocolError::ReservedByteInName(b));
    }
    Ok(())
}

impl Decoder for IntroductionCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        let Some(offset) = src[self.next_index..]
            .iter()
            .position(|b| is_name_terminator(*b))
        else {
            self.next_index = src.len();
            // Allow one extra byte for a pending '\r'.
            if src.len() > self.max_len + 1 {
                return Err(ProtocolError::NameTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        let mut raw = &line[..line.len() - 1];
        if let [rest @ .., b'\r'] = raw {
            raw = rest;
        }

        if raw.len() > self.max_len {
            return Err(ProtocolError::NameTooLong {
                actual: raw.len(),
                limit: self.max_len,
            });
        }
        let name = std::str::from_utf8(raw).map_err(|e| ProtocolError::utf8(Field::Name, e))?;
        if name.trim().is_empty() {
            return Err(ProtocolError::EmptyName);
        }
        Ok(Some(name.to_owned()))
    }
}

impl Encoder<String> for IntroductionCodec {
    type Error = ProtocolError;

    fn encode(&mut self, name: String, dst: &mut BytesMut) -> error::Result<()> {
        validate_name(&name, self.max_len)?;
        dst.reserve(name.len() + 1);
        dst.put_slice(name.as_bytes());
        dst.put_u8(TERMINATOR);
        Ok(())
    }
}
