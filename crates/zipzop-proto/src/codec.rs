//! Frame codec for tokio.
//!
//! Reassembles frames from a byte stream. A transport read may carry part of
//! a frame or several frames at once; the codec buffers until both
//! terminators of a frame have arrived.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::frame::{self, EncodedFrame, Frame, TERMINATOR};

/// Default upper bound on a single frame, terminators included.
pub const DEFAULT_MAX_FRAME_LEN: usize = 1024;

/// Codec that turns a byte stream into [`Frame`]s and back.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    /// Index of next byte to check for a terminator
    next_index: usize,
    /// Position of the content terminator of the frame being assembled
    content_end: Option<usize>,
    /// Maximum frame length
    max_len: usize,
}

impl FrameCodec {
    /// Create a codec with the default frame limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_FRAME_LEN)
    }

    /// Create a codec with a custom frame limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            content_end: None,
            max_len,
        }
    }

    /// Maximum frame length accepted by this codec.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn reset(&mut self) {
        self.next_index = 0;
        self.content_end = None;
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Frame>> {
        if self.content_end.is_none() {
            match src[self.next_index..].iter().position(|b| *b == TERMINATOR) {
                Some(offset) => {
                    let end = self.next_index + offset;
                    self.content_end = Some(end);
                    self.next_index = end + 1;
                }
                None => return self.incomplete(src),
            }
        }

        match src[self.next_index..].iter().position(|b| *b == TERMINATOR) {
            Some(offset) => {
                let raw = src.split_to(self.next_index + offset + 1);
                self.reset();

                if raw.len() > self.max_len {
                    return Err(ProtocolError::FrameTooLong {
                        actual: raw.len(),
                        limit: self.max_len,
                    });
                }

                frame::decode(&raw).map(Some)
            }
            None => self.incomplete(src),
        }
    }
}

impl FrameCodec {
    /// Remember how far we scanned and reject partial frames that are
    /// already over the limit.
    fn incomplete(&mut self, src: &BytesMut) -> error::Result<Option<Frame>> {
        self.next_index = src.len();
        if src.len() > self.max_len {
            return Err(ProtocolError::FrameTooLong {
                actual: src.len(),
                limit: self.max_len,
            });
        }
        Ok(None)
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> error::Result<()> {
        let encoded = frame.encode()?;
        dst.extend_from_slice(encoded.as_bytes());
        Ok(())
    }
}

impl Encoder<EncodedFrame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: EncodedFrame, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(frame.as_bytes());
        Ok(())
    }
}
