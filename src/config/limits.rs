//! Per-connection limits configuration.

use serde::Deserialize;
use std::time::Duration;

/// Per-connection limits.
///
/// These bound the memory a single peer can pin on the server: its
/// reassembly buffer, its declared name and its queue of pending broadcasts.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum frame length in bytes, both terminators included (default: 1024).
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
    /// Maximum length of a declared name in bytes (default: 32).
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
    /// Frames a session may have queued before broadcasts to it are dropped (default: 64).
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
    /// Seconds a new connection has to send its name (default: 30).
    #[serde(default = "default_handshake_timeout_secs")]
    pub handshake_timeout_secs: u64,
}

impl LimitsConfig {
    /// Handshake timeout as a [`Duration`].
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_frame_len: default_max_frame_len(),
            max_name_len: default_max_name_len(),
            outbound_queue: default_outbound_queue(),
            handshake_timeout_secs: default_handshake_timeout_secs(),
        }
    }
}

fn default_max_frame_len() -> usize {
    zipzop_proto::DEFAULT_MAX_FRAME_LEN
}

fn default_max_name_len() -> usize {
    zipzop_proto::DEFAULT_MAX_NAME_LEN
}

fn default_outbound_queue() -> usize {
    64
}

fn default_handshake_timeout_secs() -> u64 {
    30
}
