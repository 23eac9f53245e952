//! Layered CLI configuration.
//!
//! Later layers win: `.env` files, then `~/.poststore/config.toml` (or the
//! `--config` path), then `DATABASE_URL` / `POSTSTORE_REPLICA_URL` /
//! `POSTSTORE_MAX_CONNECTIONS`, then command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use poststore_store::StoreConfig;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_REPLICA_URL: &str = "POSTSTORE_REPLICA_URL";
pub const ENV_MAX_CONNECTIONS: &str = "POSTSTORE_MAX_CONNECTIONS";

/// `~/.poststore`
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".poststore"))
}

/// `~/.poststore/config.toml`
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Load `.env` from the working directory, then `~/.poststore/.env`.
///
/// Variables already set are never overwritten, so the first file wins.
pub fn load_env_files() {
    dotenvy::dotenv().ok();

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() {
            dotenvy::from_path(&env_file).ok();
        }
    }
}

/// Command-line overrides; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub replica_url: Option<String>,
    pub max_connections: Option<u32>,
}

/// Resolve the store configuration from every layer
pub fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<StoreConfig> {
    let mut config = match explicit {
        Some(path) => from_file(path)?,
        None => match config_path().filter(|p| p.exists()) {
            Some(path) => from_file(&path)?,
            None => StoreConfig::default(),
        },
    };

    apply_env(&mut config, |key| std::env::var(key).ok())?;
    apply_overrides(&mut config, overrides);

    tracing::debug!(
        replica = config.replica_url.is_some(),
        max_connections = config.max_connections,
        "configuration resolved"
    );
    Ok(config)
}

/// Parse a TOML config file
pub fn from_file(path: &Path) -> Result<StoreConfig> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).context(format!("Failed to parse config file: {:?}", path))
}

fn apply_env(config: &mut StoreConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(url) = lookup(ENV_DATABASE_URL) {
        config.database_url = url;
    }
    if let Some(url) = lookup(ENV_REPLICA_URL) {
        config.replica_url = Some(url);
    }
    if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
        config.max_connections = raw
            .parse()
            .context(format!("{ENV_MAX_CONNECTIONS} must be a positive integer, got {raw:?}"))?;
    }
    Ok(())
}

fn apply_overrides(config: &mut StoreConfig, overrides: Overrides) {
    if let Some(url) = overrides.database_url {
        config.database_url = url;
    }
    if let Some(url) = overrides.replica_url {
        config.replica_url = Some(url);
    }
    if let Some(max) = overrides.max_connections {
        config.max_connections = max;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
database_url = "postgres://primary/posts"
replica_url = "postgres://replica/posts"
max_connections = 12
migrate = false
"#
        )
        .unwrap();

        let config = from_file(file.path()).unwrap();
        assert_eq!(config.database_url, "postgres://primary/posts");
        assert_eq!(config.replica_url.as_deref(), Some("postgres://replica/posts"));
        assert_eq!(config.max_connections, 12);
        assert!(!config.migrate);
    }

    #[test]
    fn malformed_file_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_connections = \"many\"").unwrap();

        let err = from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn env_then_flags_override_file() {
        let mut config = StoreConfig {
            database_url: "postgres://file/posts".into(),
            ..StoreConfig::default()
        };

        apply_env(
            &mut config,
            env(&[
                (ENV_DATABASE_URL, "postgres://env/posts"),
                (ENV_MAX_CONNECTIONS, "9"),
            ]),
        )
        .unwrap();
        assert_eq!(config.database_url, "postgres://env/posts");
        assert_eq!(config.max_connections, 9);
        assert_eq!(config.replica_url, None);

        apply_overrides(
            &mut config,
            Overrides {
                database_url: Some("postgres://flag/posts".into()),
                ..Overrides::default()
            },
        );
        assert_eq!(config.database_url, "postgres://flag/posts");
        assert_eq!(config.max_connections, 9);
    }

    #[test]
    fn bad_connection_count_is_rejected() {
        let mut config = StoreConfig::default();
        let err = apply_env(&mut config, env(&[(ENV_MAX_CONNECTIONS, "lots")])).unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_CONNECTIONS));
    }
}
