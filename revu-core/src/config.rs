//! Configuration for revu tools
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (REVU_*)
//! 3. Config file (~/.config/revu/config.toml)
//! 4. Default values

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for review XML files when none are given explicitly
    pub reviews_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if the file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/revu/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("revu").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - REVU_REVIEWS_DIR: Directory holding review XML files
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var("REVU_REVIEWS_DIR") {
            self.reviews_dir = Some(PathBuf::from(dir));
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, reviews_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = reviews_dir {
            self.reviews_dir = Some(dir);
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(reviews_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self::load()?.with_env_overrides().with_cli_overrides(reviews_dir))
    }
}
