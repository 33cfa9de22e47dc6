//! Application configuration.
//!
//! One `AppConfig` is constructed at startup and passed by reference to the
//! API client and session store — no module reads the environment at load
//! time. Load order: built-in defaults, then the TOML config file, then
//! `GOVGRAPH_*` environment overrides.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, GovResult};
use crate::paths::GovPaths;

/// Edge-label vocabulary used to derive a contract's related entities.
///
/// The backend's label set is an external, unverified contract, so the
/// mapping is configurable rather than hard-coded. Defaults match the
/// vocabulary the backend ships today.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EdgeLabelConfig {
    /// vendor → contract
    pub awarded: String,
    /// awarding agency → contract
    pub awarded_contract: String,
    /// funding agency → contract
    pub funded: String,
}

impl Default for EdgeLabelConfig {
    fn default() -> Self {
        Self {
            awarded: "AWARDED".to_string(),
            awarded_contract: "AWARDED_CONTRACT".to_string(),
            funded: "FUNDED".to_string(),
        }
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the analytics/graph REST API, without a trailing slash.
    pub api_base_url: String,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// Page size for list endpoints.
    pub page_size: u32,
    /// Identity-provider user pool (informational; token issuance is external).
    pub user_pool_id: Option<String>,
    /// Identity-provider client id (informational).
    pub client_id: Option<String>,
    /// Edge-label vocabulary for related-entity derivation.
    pub edge_labels: EdgeLabelConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(10),
            page_size: 20,
            user_pool_id: None,
            client_id: None,
            edge_labels: EdgeLabelConfig::default(),
        }
    }
}

/// On-disk shape of the TOML config file. Every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    page_size: Option<u32>,
    user_pool_id: Option<String>,
    client_id: Option<String>,
    edge_labels: Option<EdgeLabelConfig>,
}

impl AppConfig {
    /// Load configuration: defaults → config file (if present) → env overrides.
    pub fn load(paths: &GovPaths) -> GovResult<Self> {
        let mut config = Self::default();

        let file = paths.config_file();
        if file.exists() {
            let text = std::fs::read_to_string(&file).map_err(|source| ConfigError::Io {
                path: file.display().to_string(),
                source,
            })?;
            let parsed: ConfigFile =
                toml::from_str(&text).map_err(|e| ConfigError::Parse {
                    path: file.display().to_string(),
                    message: e.to_string(),
                })?;
            config.apply_file(parsed);
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = file.page_size {
            self.page_size = size;
        }
        if file.user_pool_id.is_some() {
            self.user_pool_id = file.user_pool_id;
        }
        if file.client_id.is_some() {
            self.client_id = file.client_id;
        }
        if let Some(labels) = file.edge_labels {
            self.edge_labels = labels;
        }
    }

    /// Apply `GOVGRAPH_*` overrides. The lookup function is injected so tests
    /// never touch the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GOVGRAPH_API_URL") {
            self.api_base_url = url;
        }
        if let Some(size) = lookup("GOVGRAPH_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.page_size = size;
        }
        if let Some(secs) = lookup("GOVGRAPH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.request_timeout = Duration::from_secs(secs);
        }
    }

    fn validate(&self) -> GovResult<()> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::Invalid {
                message: "api_base_url must not be empty".to_string(),
            }
            .into());
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                message: "page_size must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 20);
        assert_eq!(config.edge_labels.awarded, "AWARDED");
    }

    #[test]
    fn file_values_override_defaults() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            api_base_url = "https://api.example.gov"
            page_size = 50

            [edge_labels]
            funded = "FUNDS"
            "#,
        )
        .unwrap();
        let mut config = AppConfig::default();
        config.apply_file(parsed);
        assert_eq!(config.api_base_url, "https://api.example.gov");
        assert_eq!(config.page_size, 50);
        assert_eq!(config.edge_labels.funded, "FUNDS");
        // Unset sub-keys fall back to their defaults.
        assert_eq!(config.edge_labels.awarded, "AWARDED");
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = AppConfig::default();
        config.api_base_url = "https://from-file.example.gov".to_string();
        config.apply_env(|key| match key {
            "GOVGRAPH_API_URL" => Some("https://from-env.example.gov".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "https://from-env.example.gov");
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = GovPaths::rooted(dir.path());
        std::fs::create_dir_all(&paths.config_dir).unwrap();
        std::fs::write(paths.config_file(), "page_size = \"twenty\"").unwrap();
        assert!(AppConfig::load(&paths).is_err());
    }
}
