//! `contextloom config`: Print the default configuration.

use contextloom_config::LoomConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = LoomConfig::config_dir().join("config.toml");
    println!("# {}", config_path.display());
    println!("{}", LoomConfig::default_toml());
    Ok(())
}
