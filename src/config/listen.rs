//! Network listener configuration.

use serde::Deserialize;

/// Default chat port.
pub const DEFAULT_PORT: u16 = 1234;

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:1234" or "localhost:1234").
    /// Host names are resolved at startup.
    #[serde(default = "default_address")]
    pub address: String,
    /// Pending-connection queue length passed to listen(2).
    #[serde(default = "default_backlog")]
    pub backlog: u32,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            backlog: default_backlog(),
        }
    }
}

fn default_address() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

fn default_backlog() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listen_defaults() {
        let cfg: ListenConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.address, "0.0.0.0:1234");
        assert_eq!(cfg.backlog, 10);
    }

    #[test]
    fn test_listen_override() {
        let cfg: ListenConfig = toml::from_str(
            r#"
            address = "127.0.0.1:4000"
            backlog = 128
            "#,
        )
        .unwrap();
        assert_eq!(cfg.address, "127.0.0.1:4000");
        assert_eq!(cfg.backlog, 128);
    }
}
