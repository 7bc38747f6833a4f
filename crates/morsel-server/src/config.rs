//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Shared secret expected in `X-Internal-Token`. `None` means the check
    /// is disabled (local development mode).
    pub internal_token: Option<String>,

    /// Path to the SQLite database file. `None` uses an in-memory store.
    pub db_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".parse().unwrap(),
            internal_token: None,
            db_path: None,
        }
    }
}

impl ServerConfig {
    /// Create a new server config with an optional internal token.
    /// Pass `None` to disable the token check (local development mode).
    pub fn new(internal_token: Option<String>) -> Self {
        Self {
            internal_token,
            ..Default::default()
        }
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the database path.
    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ServerConfig::new(Some("secret".to_string()))
            .with_bind_address("0.0.0.0:9000".parse().unwrap())
            .with_db_path("/tmp/morsel.db");

        assert_eq!(config.internal_token, Some("secret".to_string()));
        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/morsel.db")));
    }

    #[test]
    fn test_default_has_no_token() {
        let config = ServerConfig::default();
        assert!(config.internal_token.is_none());
        assert!(config.db_path.is_none());
    }
}
