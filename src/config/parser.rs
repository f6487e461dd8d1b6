//! Reading `review-sweep.toml` from disk

use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the config file at `path`
///
/// Every section is optional; an empty file yields [`Config::default`].
///
/// ```no_run
/// use std::path::Path;
/// use review_sweep::config::load_config;
///
/// let config = load_config(Path::new("review-sweep.toml")).unwrap();
/// assert!(config.crawler.workers >= 1);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex SHA-256 of the raw file, logged at startup to tell runs apart
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&content)))
}

/// [`load_config`] plus [`compute_config_hash`]
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
