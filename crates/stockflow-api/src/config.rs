//! # Client Configuration
//!
//! Where the backend lives, how to log in, and dashboard preferences.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STOCKFLOW_API_URL=https://shop.example.com/api                     │
//! │     STOCKFLOW_EMAIL=admin@example.com                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $STOCKFLOW_CONFIG, or                                              │
//! │     ~/.config/stockflow/config.toml (Linux)                            │
//! │     ~/Library/Application Support/com.stockflow.stockflow/... (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:3000/api, 30 s timeout, PATCH updates             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://shop.example.com/api"
//! timeout_secs = 30
//! update_method = "patch"  # patch | put
//!
//! [auth]
//! email = "admin@example.com"
//! password = "secret"
//!
//! [dashboard]
//! low_stock_threshold = 5
//! log_filter = "info,stockflow=debug,reqwest=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ConfigError;
use stockflow_core::DEFAULT_LOW_STOCK_THRESHOLD;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "STOCKFLOW_CONFIG";

// =============================================================================
// Update Method
// =============================================================================

/// HTTP verb used to update an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMethod {
    /// Partial update (default).
    #[default]
    Patch,

    /// Full replacement.
    Put,
}

impl std::fmt::Display for UpdateMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateMethod::Patch => write!(f, "patch"),
            UpdateMethod::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for UpdateMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patch" => Ok(UpdateMethod::Patch),
            "put" => Ok(UpdateMethod::Put),
            other => Err(ConfigError::Invalid(format!(
                "Unknown update method: '{}'. Valid options: patch, put",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Backend location and request behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Root of the REST API; collections are appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub update_method: UpdateMethod,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            update_method: UpdateMethod::default(),
        }
    }
}

/// Credentials used by the headless runner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

/// Dashboard preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Products with fewer units than this are flagged as low stock.
    #[serde(default = "default_low_stock")]
    pub low_stock_threshold: i64,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_low_stock() -> i64 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_log_filter() -> String {
    "info,stockflow=debug,reqwest=warn".to_string()
}

impl Default for DashboardSettings {
    fn default() -> Self {
        DashboardSettings {
            low_stock_threshold: default_low_stock(),
            log_filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Client Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub dashboard: DashboardSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, `$STOCKFLOW_CONFIG`, or the platform dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Base URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if self.dashboard.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(
                "low_stock_threshold cannot be negative".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from `lookup` (the environment, in production).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("STOCKFLOW_API_URL") {
            debug!(url = %url, "Overriding base URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup("STOCKFLOW_API_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(t) => self.api.timeout_secs = t,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric STOCKFLOW_API_TIMEOUT"),
            }
        }

        if let Some(method) = lookup("STOCKFLOW_UPDATE_METHOD") {
            match method.parse() {
                Ok(parsed) => self.api.update_method = parsed,
                Err(e) => warn!(error = %e, "Ignoring STOCKFLOW_UPDATE_METHOD"),
            }
        }

        if let Some(email) = lookup("STOCKFLOW_EMAIL") {
            self.auth.email = Some(email);
        }

        if let Some(password) = lookup("STOCKFLOW_PASSWORD") {
            self.auth.password = Some(password);
        }

        if let Some(threshold) = lookup("STOCKFLOW_LOW_STOCK") {
            if let Ok(t) = threshold.parse::<i64>() {
                self.dashboard.low_stock_threshold = t;
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stockflow", "stockflow")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Email and password, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.auth.email, &self.auth.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_update_method_parsing() {
        assert_eq!("patch".parse::<UpdateMethod>().unwrap(), UpdateMethod::Patch);
        assert_eq!(" PUT ".parse::<UpdateMethod>().unwrap(), UpdateMethod::Put);
        assert!("post".parse::<UpdateMethod>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.api.update_method, UpdateMethod::Patch);
        assert_eq!(config.dashboard.low_stock_threshold, 5);
        assert!(config.credentials().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ClientConfig::from_toml(
            r#"
            [api]
            base_url = "https://shop.example.com/api"
            update_method = "put"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://shop.example.com/api");
        assert_eq!(config.api.update_method, UpdateMethod::Put);
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.dashboard.log_filter, "info,stockflow=debug,reqwest=warn");
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ftp://files.example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        config.api.base_url = "https://shop.example.com".into();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("STOCKFLOW_API_URL", "https://other.example.com"),
            ("STOCKFLOW_API_TIMEOUT", "abc"),
            ("STOCKFLOW_UPDATE_METHOD", "put"),
            ("STOCKFLOW_EMAIL", "me@example.com"),
            ("STOCKFLOW_PASSWORD", "pw"),
            ("STOCKFLOW_LOW_STOCK", "12"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://other.example.com");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.api.update_method, UpdateMethod::Put);
        assert_eq!(config.credentials(), Some(("me@example.com", "pw")));
        assert_eq!(config.dashboard.low_stock_threshold, 12);
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("stockflow-{}", uuid::Uuid::new_v4()))
            .join("config.toml");

        let mut config = ClientConfig::default();
        config.api.base_url = "https://saved.example.com/api".into();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded = ClientConfig::from_toml(&contents).unwrap();
        assert_eq!(loaded.api.base_url, "https://saved.example.com/api");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
