//! Dashboard configuration.
//!
//! Stored in TOML at `~/.config/tms/config.toml` (or XDG equivalent). All
//! fields have defaults, so a missing file is not an error.
//!
//! # Example Configuration
//!
//! ```toml
//! endpoint = "https://vit-tm-task.api.trademarkia.app/api/v3/us"
//! query = "check"
//! rows = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Search endpoint the startup fetch posts to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Free-text query sent in the request body.
    #[serde(default = "default_query")]
    pub query: String,

    /// Page size requested from the server.
    #[serde(default = "default_rows")]
    pub rows: u32,
}

fn default_endpoint() -> String {
    "https://vit-tm-task.api.trademarkia.app/api/v3/us".to_string()
}

fn default_query() -> String {
    "check".to_string()
}

fn default_rows() -> u32 {
    10
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            query: default_query(),
            rows: default_rows(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from the default location.
    ///
    /// Returns defaults if the file doesn't exist. `TMS_ENDPOINT` in the
    /// environment overrides the configured endpoint either way.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        if let Ok(endpoint) = dotenvy::var("TMS_ENDPOINT") {
            config.endpoint = endpoint;
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the default configuration file path.
    ///
    /// Uses XDG conventions:
    /// - Primary: `$XDG_CONFIG_HOME/tms/config.toml`
    /// - Fallback: platform-specific config dir (e.g., `~/.config/tms/config.toml` on Linux)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Ok(PathBuf::from(xdg_config).join("tms").join("config.toml"));
        }

        dirs::config_dir()
            .map(|p| p.join("tms").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation("endpoint cannot be empty".into()));
        }

        if self.rows == 0 {
            return Err(ConfigError::Validation(
                "rows must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert!(config.endpoint.contains("trademarkia"));
        assert_eq!(config.query, "check");
        assert_eq!(config.rows, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_missing_file_yields_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = DashboardConfig::load_from(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.rows, 10);
    }

    #[test]
    #[serial]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "rows = 25\n").unwrap();

        let config = DashboardConfig::load_from(&path).unwrap();
        assert_eq!(config.rows, 25);
        assert_eq!(config.query, "check");
    }

    #[test]
    #[serial]
    fn test_save_and_reload_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let mut config = DashboardConfig::default();
        config.query = "widget".into();
        config.rows = 50;
        config.save_to(&path).unwrap();

        let reloaded = DashboardConfig::load_from(&path).unwrap();
        assert_eq!(reloaded.query, "widget");
        assert_eq!(reloaded.rows, 50);
    }

    #[test]
    #[serial]
    fn test_env_endpoint_override() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "endpoint = \"https://example.com/a\"\n").unwrap();

        unsafe { std::env::set_var("TMS_ENDPOINT", "https://example.com/override") };
        let config = DashboardConfig::load_from(&path);
        unsafe { std::env::remove_var("TMS_ENDPOINT") };

        assert_eq!(config.unwrap().endpoint, "https://example.com/override");
    }

    #[test]
    #[serial]
    fn test_validation_rejects_bad_values() {
        let empty_endpoint = DashboardConfig {
            endpoint: "  ".into(),
            ..Default::default()
        };
        assert!(empty_endpoint.validate().is_err());

        let zero_rows = DashboardConfig {
            rows: 0,
            ..Default::default()
        };
        assert!(zero_rows.validate().is_err());
    }
}
