//! Configuration management for MutualRisk.

mod settings;

pub use settings::{ApiConfig, BacktestIdParam, CacheConfig, Config, KeyBindings, UiConfig};

use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Prefix for environment overrides, e.g. `MUTUALRISK_API__BASE_URL`.
pub const ENV_PREFIX: &str = "MUTUALRISK";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "mutualrisk", "mutualrisk")
}

/// Get the configuration directory path.
pub fn config_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::config("Could not determine config directory"))
}

/// Get the log directory path.
pub fn log_dir() -> Result<PathBuf> {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("logs"))
        .ok_or_else(|| Error::config("Could not determine log directory"))
}

/// Default location of `config.toml`.
pub fn default_config_path() -> PathBuf {
    config_dir()
        .map(|p| p.join("config.toml"))
        .unwrap_or_else(|_| PathBuf::from("config.toml"))
}
