//! The JSON configuration file.

use std::fs;
use std::path::Path;

use anyhow::Context;
use dianxiaomi_auth::ApiUser;
use dianxiaomi_orders::Order;
use dianxiaomi_router::ServerConfig;
use serde::Deserialize;
use tracing::debug;

/// Everything the binary needs to assemble a server.
///
/// Every section is optional. A missing file section means an empty
/// user directory or order store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub users: Vec<ApiUser>,
    pub orders: Vec<Order>,
}

impl AppConfig {
    /// Parses a config document.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid config document")
    }

    /// Reads and parses the config file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json(&json)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        debug!(
            path = %path.display(),
            users = config.users.len(),
            orders = config.orders.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert!(config.users.is_empty());
        assert!(config.orders.is_empty());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "server": {{ "name": "Test Shop", "jsonp_enabled": false }},
                "orders": [{{
                    "id": 3,
                    "created_at": "2024-01-01T00:00:00Z",
                    "updated_at": "2024-01-01T00:00:00Z",
                    "status": "on-hold"
                }}]
            }}"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.name, "Test Shop");
        assert!(!config.server.jsonp_enabled);
        assert_eq!(config.orders[0].id, 3);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = AppConfig::load(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.json"));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{ not json").unwrap();
        let err = AppConfig::load(&bad).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_load_or_default() {
        let config = AppConfig::load_or_default(None).unwrap();
        assert_eq!(config.server.name, "Dianxiaomi");
    }
}
