//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/papyrus/config.toml)
//! 3. Environment variables (PAPYRUS_* prefix)
//!
//! Environment variables take precedence over config file values. The CLI
//! applies `--store` on top of all of these.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::storage::{CommitAuthor, INDEX_FILE};
use crate::tags::TAGS_DIR;

/// Environment variable prefix
const ENV_PREFIX: &str = "PAPYRUS";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store directory (git working tree holding index.yaml and papers)
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Commit author name (falls back to git config)
    #[serde(default)]
    pub author_name: Option<String>,

    /// Commit author email (falls back to git config)
    #[serde(default)]
    pub author_email: Option<String>,

    /// Write logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            author_name: None,
            author_email: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (PAPYRUS_STORE_DIR, PAPYRUS_AUTHOR_NAME, PAPYRUS_AUTHOR_EMAIL)
    /// 2. Config file (~/.config/papyrus/config.toml or PAPYRUS_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, reading `cli_path` instead of the default file
    /// when given
    pub fn load_with_cli_override(cli_path: Option<&PathBuf>) -> Result<Self> {
        match cli_path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load only what the file at `path` says, without environment overrides
    ///
    /// This is the base to edit and save back, so one-off environment
    /// settings never end up in the file.
    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_STORE_DIR", ENV_PREFIX)) {
            if !val.is_empty() {
                self.store_dir = PathBuf::from(val);
            }
        }

        // Empty string clears the setting
        if let Ok(val) = std::env::var(format!("{}_AUTHOR_NAME", ENV_PREFIX)) {
            self.author_name = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_AUTHOR_EMAIL", ENV_PREFIX)) {
            self.author_email = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with PAPYRUS_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("papyrus")
            .join("config.toml")
    }

    /// Get the path to the index document
    pub fn index_path(&self) -> PathBuf {
        self.store_dir.join(INDEX_FILE)
    }

    /// Get the path to the tags directory
    pub fn tags_dir(&self) -> PathBuf {
        self.store_dir.join(TAGS_DIR)
    }

    /// Identity to record on commits
    pub fn commit_author(&self) -> CommitAuthor {
        CommitAuthor {
            name: self.author_name.clone(),
            email: self.author_email.clone(),
        }
    }
}

/// Get the default store directory
fn default_store_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("papyrus")
}
