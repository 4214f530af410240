use std::path::PathBuf;

use clap::Subcommand;
use companion_core::EngineConfig;

use super::config_path;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the whole configuration as TOML
    Show,
    /// Get a config value
    Get {
        /// Dot-separated key (e.g. "cooldown.normal_secs", "features.weather_insights")
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// Print the config file location
    Path,
    /// Check the config file without changing it
    Validate,
}

pub fn run(action: ConfigAction, path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path(path)?;
    match action {
        ConfigAction::Show => {
            let config = EngineConfig::load(&path)?;
            print!("{}", config.to_toml_string()?);
        }
        ConfigAction::Get { key } => {
            let config = EngineConfig::load(&path)?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = EngineConfig::load(&path)?;
            config.set(&key, &value)?;
            config.save(&path)?;
            println!("ok");
        }
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Validate => {
            let content = std::fs::read_to_string(&path)?;
            EngineConfig::from_toml_str(&content)?;
            println!("valid");
        }
    }
    Ok(())
}
