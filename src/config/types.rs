//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::{
    default_countdown, default_grace_ms, default_log_level, default_server_name, default_tick_ms,
    default_true,
};
use super::limits::LimitsConfig;
use super::listen::ListenConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
///
/// Every section is optional; an empty file yields the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Per-connection limits.
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Server-originated notices and echo behavior.
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    /// `/shutdown` countdown timing.
    #[serde(default)]
    pub shutdown: ShutdownConfig,
    /// Logging output.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Sender name on server-originated broadcasts (e.g., "server").
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

/// Broadcast behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    /// Announce each new session to the room.
    #[serde(default = "default_true")]
    pub arrivals: bool,
    /// Announce sessions that disconnect.
    #[serde(default = "default_true")]
    pub departures: bool,
    /// Deliver a client's own lines back to it.
    #[serde(default = "default_true")]
    pub echo_to_sender: bool,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            arrivals: true,
            departures: true,
            echo_to_sender: true,
        }
    }
}

/// Shutdown countdown configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShutdownConfig {
    /// Number of countdown notices before teardown (default: 10).
    #[serde(default = "default_countdown")]
    pub countdown: u32,
    /// Milliseconds between countdown notices (default: 1000).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Milliseconds a session gets to flush and close before it is aborted (default: 2000).
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

impl ShutdownConfig {
    /// Interval between countdown notices.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Per-session teardown grace period.
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            countdown: default_countdown(),
            tick_ms: default_tick_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g., "info", "zipzop=debug").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
