//! Error types for the zipzop wire protocol.
//!
//! Every failure to encode or decode a frame or an introduction surfaces as a
//! [`ProtocolError`]. Decoding never reads past the supplied buffer.

use std::fmt;

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// The part of the wire format an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Message body, the first field of a frame.
    Content,
    /// Sender name, the second field of a frame.
    Sender,
    /// Name declared during the introduction.
    Name,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Content => "content",
            Self::Sender => "sender",
            Self::Name => "name",
        })
    }
}

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A field contains the terminator byte and cannot be framed.
    #[error("{field} contains a NUL terminator")]
    EmbeddedTerminator {
        /// Offending field.
        field: Field,
    },

    /// The buffer ended before the terminator of a field.
    #[error("missing terminator after {field}")]
    MissingTerminator {
        /// Field whose terminator was not found.
        field: Field,
    },

    /// Bytes follow the sender terminator of a frame.
    #[error("{count} trailing bytes after frame")]
    TrailingBytes {
        /// Number of unexpected bytes.
        count: usize,
    },

    /// A frame (complete or partial) exceeded the allowed length.
    #[error("frame too long: {actual} bytes (limit: {limit})")]
    FrameTooLong {
        /// Observed length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// A field is not valid UTF-8.
    #[error("invalid UTF-8 in {field} at byte {byte_pos}: {details}")]
    InvalidUtf8 {
        /// Field that failed validation.
        field: Field,
        /// Byte position where UTF-8 validation failed.
        byte_pos: usize,
        /// Detailed error message from the UTF-8 decoder.
        details: String,
    },

    /// The introduction carried an empty name.
    #[error("empty name")]
    EmptyName,

    /// The introduction name is longer than allowed.
    #[error("name too long: {actual} bytes (limit: {limit})")]
    NameTooLong {
        /// Observed length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// The name contains a byte reserved for framing.
    #[error("name contains a reserved byte: {0:#04x}")]
    ReservedByteInName(u8),
}

impl ProtocolError {
    /// Static label for log fields.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::EmbeddedTerminator { .. } => "embedded_terminator",
            Self::MissingTerminator { .. } => "missing_terminator",
            Self::TrailingBytes { .. } => "trailing_bytes",
            Self::FrameTooLong { .. } => "frame_too_long",
            Self::InvalidUtf8 { .. } => "invalid_utf8",
            Self::EmptyName => "empty_name",
            Self::NameTooLong { .. } => "name_too_long",
            Self::ReservedByteInName(_) => "reserved_byte",
        }
    }

    pub(crate) fn utf8(field: Field, err: std::str::Utf8Error) -> Self {
        Self::InvalidUtf8 {
            field,
            byte_pos: err.valid_up_to(),
            details: err.to_string(),
        }
    }
}
