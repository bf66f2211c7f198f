//! Configuration for the iterate front-end.
//!
//! The config file lives at `<config dir>/iterate/config.json`. Every field
//! has a default, so an empty object (or no file at all) is a valid config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the platform config/data dirs.
pub const APP_DIR: &str = "iterate";

/// Main configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Command and arguments that start the journal backend.
    #[serde(default = "default_backend_command")]
    pub backend_command: Vec<String>,

    /// How long to wait for any single backend call.
    ///
    /// Backend calls may open native dialogs, so this is generous.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Override for the `last_use.json` location.
    #[serde(default)]
    pub settings_path: Option<PathBuf>,

    /// Override for the log file location.
    #[serde(default)]
    pub log_path: Option<PathBuf>,
}

fn default_backend_command() -> Vec<String> {
    vec!["iterate-backend".into()]
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_command: default_backend_command(),
            request_timeout_seconds: default_request_timeout(),
            settings_path: None,
            log_path: None,
        }
    }
}

impl Config {
    /// Default config file path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Where `last_use.json` lives.
    pub fn resolved_settings_path(&self) -> Option<PathBuf> {
        self.settings_path
            .clone()
            .or_else(crate::settings::SettingsStore::default_path)
    }

    /// Where the log file lives.
    pub fn resolved_log_path(&self) -> Option<PathBuf> {
        self.log_path
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR).join("iterate.log")))
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
