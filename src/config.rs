//! Client configuration.

use std::path::{Path, PathBuf};

use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::ConfigError;

/// Environment variable overriding [`AppConfig::server_url`].
pub const SERVER_URL_ENV: &str = "TICTACTOE_SERVER_URL";

/// Configuration for the client application.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct AppConfig {
    /// Base URL of the game backend.
    #[serde(default = "default_server_url")]
    server_url: String,

    /// File holding durable credentials.
    #[serde(default = "default_storage_path")]
    storage_path: PathBuf,

    /// Location the router resolves on first load.
    #[serde(default = "default_start_url")]
    start_url: String,

    /// Identity the server uses for the automated opponent.
    #[serde(default = "default_automated_opponent")]
    automated_opponent: String,

    /// Default tracing filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,

    /// Log file used by the terminal front end.
    #[serde(default = "default_log_file")]
    log_file: PathBuf,
}

fn default_server_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("tictactoe_credentials.toml")
}

fn default_start_url() -> String {
    "/".to_string()
}

fn default_automated_opponent() -> String {
    tictactoe_board::AUTOMATED_OPPONENT.to_string()
}

fn default_log_filter() -> String {
    "info,tictactoe_webapp=debug".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("tictactoe_webapp.log")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            storage_path: default_storage_path(),
            start_url: default_start_url(),
            automated_opponent: default_automated_opponent(),
            log_filter: default_log_filter(),
            log_file: default_log_file(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(server_url = %config.server_url, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Loads `path` if it exists, falls back to defaults otherwise, then
    /// applies the environment override.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            Some(p) => {
                info!(path = %p.display(), "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        Ok(config.apply_env())
    }

    /// Applies [`SERVER_URL_ENV`] if set.
    #[instrument(skip(self))]
    pub fn apply_env(self) -> Self {
        match std::env::var(SERVER_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => {
                debug!(url = %url, "Server URL overridden from environment");
                self.with_server_url(url)
            }
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml("server_url = \"http://example.test\"\n").unwrap();
        assert_eq!(config.server_url(), "http://example.test");
        assert_eq!(config.automated_opponent(), "bot");
        assert_eq!(config.start_url(), "/");
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(AppConfig::from_toml("server_url = [").is_err());
    }

    #[test]
    fn test_setters() {
        let config = AppConfig::default().with_start_url("/games/7");
        assert_eq!(config.start_url(), "/games/7");
    }
}
