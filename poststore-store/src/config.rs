//! Store connection configuration

use serde::{Deserialize, Serialize};

/// Default maximum connections per pool.
/// Kept low; every operation holds a connection only for one statement.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection settings for the primary and optional read replica
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Primary database; all writes go here
    pub database_url: String,
    /// Read replica; reads use the primary when unset
    pub replica_url: Option<String>,
    pub max_connections: u32,
    /// Run schema migrations against the primary on connect
    pub migrate: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/poststore".to_string()),
            replica_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            migrate: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg: StoreConfig =
            serde_json::from_str(r#"{"database_url": "postgres://db/posts"}"#).unwrap();
        assert_eq!(cfg.database_url, "postgres://db/posts");
        assert_eq!(cfg.replica_url, None);
        assert_eq!(cfg.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(cfg.migrate);
    }
}
