//! Error handling for zipzop.
//!
//! Startup failures map to distinct process exit statuses. Runtime errors are
//! scoped to a single session or delivery and never take the server down.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;
use zipzop_proto::ProtocolError;

use crate::config::{ConfigError, ValidationError};
use crate::state::SessionId;

// ============================================================================
// Startup Errors (process exit statuses)
// ============================================================================

/// Fatal errors raised before the server or client is running.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("bad arguments: {0}")]
    BadArgs(String),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid config: {}", format_validation(.0))]
    Invalid(Vec<ValidationError>),

    #[error("could not resolve {address}: {source}")]
    Resolve {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("could not listen on {addr}: {source}")]
    Listen {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("could not start runtime: {0}")]
    Runtime(#[source] io::Error),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl StartupError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Resolve { .. } => 1,
            Self::Bind { .. } => 2,
            Self::Listen { .. } => 3,
            Self::BadArgs(_) | Self::Config(_) | Self::Invalid(_) => 4,
            Self::Connect { .. } => 5,
            Self::Runtime(_) => 6,
        }
    }

    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadArgs(_) => "bad_args",
            Self::Config(_) => "config",
            Self::Invalid(_) => "invalid_config",
            Self::Resolve { .. } => "resolve",
            Self::Bind { .. } => "bind",
            Self::Listen { .. } => "listen",
            Self::Connect { .. } => "connect",
            Self::Runtime(_) => "runtime",
        }
    }
}

// ============================================================================
// Registry Errors
// ============================================================================

/// Errors from [`SessionRegistry::insert`](crate::state::SessionRegistry::insert).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The registry was drained by shutdown and accepts no new sessions.
    #[error("registry is closed")]
    Closed,

    #[error("session {0} is already registered")]
    Duplicate(SessionId),
}

// ============================================================================
// Delivery Errors (one recipient of a broadcast)
// ============================================================================

/// A frame could not be queued for one session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The session is not draining its queue fast enough.
    #[error("outbound queue full")]
    QueueFull,

    /// The session's worker has stopped.
    #[error("outbound queue closed")]
    Closed,
}

impl DeliveryError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::QueueFull => "queue_full",
            Self::Closed => "queue_closed",
        }
    }
}

// ============================================================================
// Handshake Errors (before a session exists)
// ============================================================================

/// Reasons a new connection is dropped before it is registered.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("no name received within {0}s")]
    Timeout(u64),

    #[error("connection closed before introduction")]
    Closed,

    #[error("bad introduction: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("registry rejected session: {0}")]
    Registry(#[from] RegistryError),
}

impl HandshakeError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "handshake_timeout",
            Self::Closed => "handshake_closed",
            Self::Protocol(e) => e.error_code(),
            Self::Registry(RegistryError::Closed) => "registry_closed",
            Self::Registry(RegistryError::Duplicate(_)) => "registry_duplicate",
        }
    }
}

// ============================================================================
// Client Errors
// ============================================================================

/// Errors raised by the chat client after it has connected.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("console error: {0}")]
    Console(#[from] io::Error),
}

impl ClientError {
    /// A session that fails after connecting is a runtime failure.
    pub fn exit_code(&self) -> i32 {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn io_err() -> io::Error {
        io::Error::other("boom")
    }

    #[test]
    fn test_exit_codes_match_causes() {
        let addr: SocketAddr = "127.0.0.1:1234".parse().unwrap();
        let cases = [
            (
                StartupError::Resolve {
                    address: "nowhere:1".into(),
                    source: io_err(),
                },
                1,
            ),
            (StartupError::Bind { addr, source: io_err() }, 2),
            (StartupError::Listen { addr, source: io_err() }, 3),
            (StartupError::BadArgs("missing name".into()), 4),
            (StartupError::Invalid(vec![ValidationError::ZeroBacklog]), 4),
            (
                StartupError::Connect {
                    address: "host:1234".into(),
                    source: io_err(),
                },
                5,
            ),
            (StartupError::Runtime(io_err()), 6),
        ];

        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{}", err.error_code());
        }
    }

    #[test]
    fn test_invalid_config_lists_every_problem() {
        let err = StartupError::Invalid(vec![
            ValidationError::ZeroBacklog,
            ValidationError::ZeroTick,
        ]);
        assert_eq!(
            err.to_string(),
            "invalid config: listen.backlog must be at least 1; shutdown.tick_ms must be at least 1"
        );
    }

    #[test]
    fn test_handshake_error_codes() {
        assert_eq!(HandshakeError::Timeout(30).error_code(), "handshake_timeout");
        assert_eq!(
            HandshakeError::from(RegistryError::Closed).error_code(),
            "registry_closed"
        );
        assert_eq!(
            HandshakeError::from(ProtocolError::EmptyName).error_code(),
            "empty_name"
        );
    }
}
