//! Classification of transport errors for session teardown.

use std::io;

use zipzop_proto::ProtocolError;

/// How a read failure ends a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ReadErrorAction {
    /// The peer went away mid-frame or reset the connection. Routine.
    PeerGone,
    /// The peer sent something that is not a frame.
    ProtocolViolation,
    /// Local I/O failure.
    IoError,
}

/// Classify a read error into an actionable category.
pub(super) fn classify_read_error(e: &ProtocolError) -> ReadErrorAction {
    match e {
        ProtocolError::Io(io_err) => match io_err.kind() {
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => ReadErrorAction::PeerGone,
            // Framed reports a truncated frame at EOF as `Other`.
            io::ErrorKind::Other => ReadErrorAction::PeerGone,
            _ => ReadErrorAction::IoError,
        },
        _ => ReadErrorAction::ProtocolViolation,
    }
}
