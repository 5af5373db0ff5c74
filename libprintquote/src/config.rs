//! Configuration management for PrintQuote

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::currency::Currency;
use crate::error::{ConfigError, Result};
use crate::storage::FileStore;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_STORAGE_PATH: &str = "~/.local/share/printquote/preferences.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Display currency used when no preference has been stored yet
    #[serde(default)]
    pub currency: Currency,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// A missing file yields the built-in defaults. Environment overrides
    /// (`PRINTQUOTE_API_URL`, `PRINTQUOTE_STORAGE`) are applied afterwards.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PRINTQUOTE_API_URL") {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(path) = std::env::var("PRINTQUOTE_STORAGE") {
            if !path.is_empty() {
                self.storage.path = path;
            }
        }
    }

    /// Storage path with `~` expanded
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.storage.path).to_string())
    }

    /// Open the configured client-side store
    pub fn open_store(&self) -> Arc<FileStore> {
        Arc::new(FileStore::from_path(self.storage_path()))
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("PRINTQUOTE_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("printquote").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.storage.path, DEFAULT_STORAGE_PATH);
        assert_eq!(config.defaults.currency, Currency::Usd);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
base_url = "https://quotes.example.com"

[defaults]
currency = "FCFA"
"#,
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.api.base_url, "https://quotes.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.storage.path, DEFAULT_STORAGE_PATH);
        assert_eq!(config.defaults.currency, Currency::Fcfa);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api\nbase_url = ").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Config::load_from_path(Path::new("/nonexistent/printquote.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    #[serial]
    fn test_load_without_file_uses_defaults_and_env() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var(
            "PRINTQUOTE_CONFIG",
            temp_dir.path().join("absent.toml").to_string_lossy().to_string(),
        );
        std::env::set_var("PRINTQUOTE_API_URL", "http://127.0.0.1:9999");
        std::env::set_var("PRINTQUOTE_STORAGE", "/tmp/pq-prefs.json");

        let config = Config::load().unwrap();

        std::env::remove_var("PRINTQUOTE_CONFIG");
        std::env::remove_var("PRINTQUOTE_API_URL");
        std::env::remove_var("PRINTQUOTE_STORAGE");

        assert_eq!(config.api.base_url, "http://127.0.0.1:9999");
        assert_eq!(config.storage_path(), PathBuf::from("/tmp/pq-prefs.json"));
    }

    #[test]
    #[serial]
    fn test_resolve_config_path_env() {
        std::env::set_var("PRINTQUOTE_CONFIG", "/etc/printquote/config.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("PRINTQUOTE_CONFIG");
        assert_eq!(path, PathBuf::from("/etc/printquote/config.toml"));
    }
}
