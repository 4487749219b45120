//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, BroadcastConfig, ShutdownConfig, LogConfig)
//! - [`listen`]: Network listener configuration (ListenConfig)
//! - [`limits`]: Per-connection limits (LimitsConfig)
//! - [`validation`]: Startup checks that report every problem at once

mod defaults;
mod limits;
mod listen;
mod types;
pub mod validation;

pub use limits::LimitsConfig;
pub use listen::{DEFAULT_PORT, ListenConfig};
pub use types::{BroadcastConfig, Config, ConfigError, LogConfig, ServerConfig, ShutdownConfig};
pub use validation::{ValidationError, validate};
