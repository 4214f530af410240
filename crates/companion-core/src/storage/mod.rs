mod config;

pub use config::{
    CooldownConfig, EngineConfig, FeaturesConfig, HealthConfig, IntentConfig, LoadConfig,
    MotionConfig, PowerConfig, PresentationConfig, WeatherConfig,
};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns `~/.config/companion[-dev]/` based on COMPANION_ENV.
///
/// Set COMPANION_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("COMPANION_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("companion-dev")
    } else {
        base_dir.join("companion")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
