//! Error types for constellation

use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading or writing the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a valid config
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The config could not be turned into JSON
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    /// No platform config directory to fall back on
    #[error("No config directory available on this platform")]
    NoConfigDir,
}

/// Result type alias for config operations
pub type Result<T> = std::result::Result<T, ConfigError>;
