//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use zipzop_proto::DEFAULT_MAX_FRAME_LEN;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.name must not contain NUL")]
    ServerNameHasTerminator,
    #[error("listen.address must be host:port, got '{0}'")]
    InvalidListenAddress(String),
    #[error("listen.backlog must be at least 1")]
    ZeroBacklog,
    #[error("limits.max_frame_len must be at least 2")]
    FrameLimitTooSmall,
    #[error("limits.max_frame_len must be at most {}, the client's read limit", DEFAULT_MAX_FRAME_LEN)]
    FrameLimitTooLarge,
    #[error("server.name leaves no room for content within limits.max_frame_len")]
    ServerNameTooLong,
    #[error("limits.max_name_len leaves no room for content within limits.max_frame_len")]
    NameLimitTooLarge,
    #[error("limits.max_name_len must be at least 1")]
    ZeroNameLimit,
    #[error("limits.outbound_queue must be at least 1")]
    ZeroOutboundQueue,
    #[error("limits.handshake_timeout_secs must be at least 1")]
    ZeroHandshakeTimeout,
    #[error("shutdown.tick_ms must be at least 1")]
    ZeroTick,
    #[error("log.level is not a valid filter: '{0}'")]
    InvalidLogLevel(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Server identity
    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.server.name.contains('\0') {
        errors.push(ValidationError::ServerNameHasTerminator);
    }

    // Listener
    let address = &config.listen.address;
    let has_port = address
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());
    if !has_port {
        errors.push(ValidationError::InvalidListenAddress(address.clone()));
    }
    if config.listen.backlog == 0 {
        errors.push(ValidationError::ZeroBacklog);
    }

    // Limits
    let max_frame_len = config.limits.max_frame_len;
    if max_frame_len < 2 {
        errors.push(ValidationError::FrameLimitTooSmall);
    }
    if max_frame_len > DEFAULT_MAX_FRAME_LEN {
        errors.push(ValidationError::FrameLimitTooLarge);
    }
    if config.limits.max_name_len == 0 {
        errors.push(ValidationError::ZeroNameLimit);
    }
    // A frame is content, sender and two terminators; the sender must leave
    // at least one byte of content.
    if max_frame_len >= 2 && config.server.name.len() + 2 >= max_frame_len {
        errors.push(ValidationError::ServerNameTooLong);
    }
    if max_frame_len >= 2 && config.limits.max_name_len + 2 >= max_frame_len {
        errors.push(ValidationError::NameLimitTooLarge);
    }
    if config.limits.outbound_queue == 0 {
        errors.push(ValidationError::ZeroOutboundQueue);
    }
    if config.limits.handshake_timeout_secs == 0 {
        errors.push(ValidationError::ZeroHandshakeTimeout);
    }

    // Shutdown
    if config.shutdown.tick_ms == 0 {
        errors.push(ValidationError::ZeroTick);
    }

    // Logging
    if EnvFilter::try_new(&config.log.level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.log.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
