//! Configuration loading and discovery for `puzzle.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::PuzzleConfig;
use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up during discovery
pub const CONFIG_FILE: &str = "puzzle.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse puzzle.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub opaque: Option<bool>,
    pub atlas: Option<String>,
    pub progress: Option<bool>,
}

/// Find puzzle.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for puzzle.toml
/// 2. Check XDG_CONFIG_HOME/puzzle/puzzle.toml (or ~/.config/puzzle/puzzle.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find puzzle.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("puzzle").join(CONFIG_FILE);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find puzzle.toml by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from `path`, or from the discovered puzzle.toml.
///
/// Falls back to [`default_config`] when no file is found. An explicit
/// path that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<PuzzleConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            debug!("config: {}", p.display());
            load_config_file(&p)
        }
        None => Ok(default_config()),
    }
}

fn load_config_file(path: &Path) -> Result<PuzzleConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: PuzzleConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

pub fn default_config() -> PuzzleConfig {
    PuzzleConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut PuzzleConfig, overrides: &CliOverrides) {
    if let Some(opaque) = overrides.opaque {
        config.export.opaque = opaque;
    }
    if let Some(ref atlas) = overrides.atlas {
        config.export.atlas = atlas.clone();
    }
    if let Some(progress) = overrides.progress {
        config.pack.progress = progress;
    }
}
