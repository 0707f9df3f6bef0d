//! Configuration management for the app store
//!
//! Values come from built-in defaults, an optional `config.toml`, and
//! `APP_STORE__*` environment variables, in increasing precedence.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Name of the directory under `save_dir` that holds one directory per app
pub const APPS_DIR: &str = "apps";

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    /// Directory holding all persisted state
    /// Environment: APP_STORE__SAVE_DIR
    pub save_dir: String,

    /// Remove the partially created app directory when a create fails
    /// Environment: APP_STORE__CLEANUP_FAILED_CREATES
    pub cleanup_failed_creates: bool,
}

impl ServiceConfig {
    /// Load configuration from `config.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from the given file (extension optional) with environment overrides
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("save_dir", "./data")?
            .set_default("cleanup_failed_creates", true)?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("APP_STORE").separator("__"))
            .build()?;

        let config: ServiceConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.save_dir.trim().is_empty() {
            return Err(ConfigError::Message("save_dir cannot be empty".into()));
        }

        Ok(())
    }

    /// Get save directory as PathBuf
    pub fn save_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.save_dir)
    }

    /// Storage root for app directories: `<save_dir>/apps`
    pub fn apps_root(&self) -> PathBuf {
        Path::new(&self.save_dir).join(APPS_DIR)
    }
}
