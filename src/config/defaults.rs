//! Default value functions for configuration.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "server".to_string()
}

// =============================================================================
// Shutdown Defaults
// =============================================================================

pub fn default_countdown() -> u32 {
    10
}

pub fn default_tick_ms() -> u64 {
    1000
}

pub fn default_grace_ms() -> u64 {
    2000
}

// =============================================================================
// Log Defaults
// =============================================================================

pub fn default_log_level() -> String {
    "info".to_string()
}
