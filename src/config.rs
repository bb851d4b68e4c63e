use crate::models::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the configuration file looked up in the working and home directories
pub const CONFIG_FILE_NAME: &str = ".ticklerc";

/// Load configuration from file or use defaults
///
/// Search order:
/// 1. Custom path if provided via --config (errors are fatal)
/// 2. .ticklerc in current directory
/// 3. ~/.ticklerc in home directory
/// 4. Built-in defaults
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let candidates = [Some(PathBuf::from(CONFIG_FILE_NAME)), home_config_path()];
    for path in candidates.into_iter().flatten() {
        if !path.exists() {
            continue;
        }
        match load_config_from_file(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config");
                return Ok(config);
            }
            Err(err) => debug!(path = %path.display(), "ignoring unreadable config: {:#}", err),
        }
    }

    Ok(Config::default())
}

fn load_config_from_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    toml::from_str(&contents).with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
}

/// Save a config to a file
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}
