// src/core/paths.rs

use crate::constants::{APP_CONFIG_DIR, APP_CONFIG_FILENAME};
use anyhow::{Result, anyhow};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error(
        "config file not found. '{env_var}' environment variable is not set and '{default_path}' does not exist"
    )]
    ConfigFileNotFound {
        env_var: &'static str,
        default_path: String,
    },
    #[error("config file not found by path {path}: {source}")]
    ConfigFileMissing {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Returns the default location of the configuration file
/// (`~/.config/project-helper/application.toml` on Linux).
pub fn get_default_config_path() -> Result<PathBuf, PathError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_CONFIG_DIR).join(APP_CONFIG_FILENAME))
        .ok_or(PathError::ConfigDirNotFound)
}

/// Picks the configuration file to load.
///
/// An explicit path (the value of `CONFIG_PATH`) wins over the default
/// location. The chosen file must exist.
pub fn resolve_config_path(
    explicit: Option<&str>,
    env_var: &'static str,
) -> Result<PathBuf, PathError> {
    let candidate = match explicit.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = get_default_config_path()?;
            if !default_path.is_file() {
                return Err(PathError::ConfigFileNotFound {
                    env_var,
                    default_path: default_path.display().to_string(),
                });
            }
            default_path
        }
    };

    std::fs::metadata(&candidate).map_err(|e| PathError::ConfigFileMissing {
        path: candidate.display().to_string(),
        source: e,
    })?;

    log::debug!("Config file found at '{}'", candidate.display());
    Ok(candidate)
}

/// Expands `~` and environment variables in the configured application path.
pub fn expand_application_path(template: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(template).map_err(|e| {
        anyhow!(
            "Failed to expand application path template '{}': {}",
            template,
            e
        )
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
