mod types;

pub use types::*;

use anyhow::{Context, Result};
use mpegrecover_core::header::PACK_HEADER_LEN;
use std::path::{Path, PathBuf};

/// Default config locations, in lookup order
const DEFAULT_PATHS: [&str; 2] = ["./mpegrecover.toml", "~/.config/mpegrecover/config.toml"];

/// Read a TOML config file without validating it
pub fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let config = read_config(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// First existing default config file, if any
pub fn find_config() -> Option<PathBuf> {
    DEFAULT_PATHS
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Read config from the given path, a default location, or fall back to defaults
///
/// The result is not validated, so command-line overrides can still fix it up.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return read_config(path);
    }

    match find_config() {
        Some(path) => {
            tracing::debug!("Using config file {:?}", path);
            read_config(&path)
        }
        None => Ok(Config::default()),
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.scan.blocksize == 0 {
        anyhow::bail!("Block size cannot be 0");
    }

    if config.scan.blocksize < PACK_HEADER_LEN {
        tracing::warn!(
            "Block size {} is smaller than a pack header; no block can be valid",
            config.scan.blocksize
        );
    }

    if config.recover.file_prefix.is_empty() {
        anyhow::bail!("Recording file prefix cannot be empty");
    }

    if config.recover.extension.is_empty() {
        anyhow::bail!("Recording file extension cannot be empty");
    }

    Ok(())
}
