use crate::core::{DataAccessError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Busy timeout applied when the configuration does not set one.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
}

/// Connection source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Database file path or `file:` URI. In-memory databases are rejected
    /// when the source is built.
    pub path: PathBuf,
    #[serde(default)]
    pub read_only: bool,
    /// Create the database file when it does not exist.
    #[serde(default = "default_create")]
    pub create: bool,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `PRAGMA name = value` pairs run on every new connection, in name order.
    #[serde(default)]
    pub pragmas: BTreeMap<String, String>,
}

fn default_create() -> bool {
    true
}

fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

impl Config {
    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| DataAccessError::Config(e.to_string()))
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Arguments
///
/// * `path` - The file path to the TOML configuration file.
///
/// # Example
///
/// ```no_run
/// let config = sqltemplate::config::load_config("sqltemplate.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Config::from_toml(&content)
}
