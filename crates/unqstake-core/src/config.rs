//! Application configuration and on-disk locations.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::pagination::DEFAULT_PAGE_SIZE;
use crate::types::Network;

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Other configuration error.
    #[error("{0}")]
    Other(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Selected network.
    #[serde(default)]
    pub network: Network,
    /// Last watched account address.
    #[serde(default)]
    pub last_account: Option<String>,
    /// SDK REST endpoint override.
    #[serde(default)]
    pub sdk_url: Option<String>,
    /// Indexer endpoint override.
    #[serde(default)]
    pub indexer_url: Option<String>,
    /// Rows per history page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::Unique,
            last_account: None,
            sdk_url: None,
            indexer_url: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ==================== Path Utilities ====================

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("network", "unique", "unqstake")
        .ok_or_else(|| ConfigError::Other("Could not determine home directory".to_string()))
}

/// Get the application data directory.
pub fn get_data_dir() -> Result<PathBuf, ConfigError> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the config directory.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the config file path.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join("config.json"))
}

/// Get the preferences database path.
pub fn get_preferences_db_path() -> Result<PathBuf, ConfigError> {
    get_data_dir().map(|dir| dir.join("preferences.db"))
}

// ==================== Config I/O ====================

/// Load configuration from a file. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file, creating parent directories.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Load configuration from the platform config directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Save configuration to the platform config directory.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path()?)
}
