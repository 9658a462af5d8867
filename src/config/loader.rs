// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::RawConfigFile;
use crate::errors::{HotbuildError, Result};

/// File picked up from the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "Hotbuild.toml";

/// Load and deserialize a configuration file.
///
/// Relative `dirs` entries are resolved against the file's own directory.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        HotbuildError::Configuration(format!("cannot read config file {:?}: {e}", path))
    })?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            config.rebase_dirs(parent);
        }
    }

    debug!(?path, "loaded config file");
    Ok(config)
}

/// Load the config file to use for this run, if any.
///
/// - An explicit path must exist.
/// - Otherwise `Hotbuild.toml` in the current directory is used when present.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<RawConfigFile>> {
    match explicit {
        Some(path) => load_from_path(path).map(Some),
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_from_path(&path).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
