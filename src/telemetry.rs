//! Logging setup and span constructors.

use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured directive. Output goes to stderr so
/// it never mixes with console traffic on stdout.
pub fn init(config: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Standardized span constructors for chat observability.
pub mod spans {
    use std::net::SocketAddr;

    use tracing::{Span, info_span};

    use crate::state::SessionId;

    /// Create a span for a connection that has not introduced itself yet.
    pub fn connection(addr: &SocketAddr) -> Span {
        info_span!("connection", addr = %addr)
    }

    /// Create a span for a registered session.
    pub fn session(id: SessionId, name: &str) -> Span {
        info_span!("session", id = %id, name = %name)
    }

    /// Create a span for the shutdown sequence.
    pub fn shutdown(sessions: usize) -> Span {
        info_span!("shutdown", sessions)
    }
}
