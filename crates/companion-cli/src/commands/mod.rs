pub mod config;
pub mod simulate;

use std::path::PathBuf;

use companion_core::{CoreError, EngineConfig};

/// Config file to use: `--config` when given, else the default location.
pub fn config_path(explicit: Option<PathBuf>) -> Result<PathBuf, CoreError> {
    match explicit {
        Some(path) => Ok(path),
        None => EngineConfig::default_path(),
    }
}
