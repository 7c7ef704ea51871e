pub mod config_cmd;
pub mod render;
pub mod training;

use contextloom_config::LoomConfig;
use std::path::Path;

/// Load the config from an explicit path, or the default location.
/// Environment overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<LoomConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(LoomConfig::load()?);
    };

    let mut config = LoomConfig::load_from(path)?;
    config.apply_overrides(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}
