//! Service configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML or has the wrong shape.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Tunables for the workspace service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Maximum in-flight delete calls during bulk report deletion.
    #[serde(default = "default_delete_concurrency")]
    pub delete_concurrency: usize,
    /// Membership poll interval in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_delete_concurrency() -> usize {
    8
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            delete_concurrency: default_delete_concurrency(),
            poll_interval_secs: default_poll_interval_secs(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}
