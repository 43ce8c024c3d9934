//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read config file at {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the YAML configuration
    #[error("failed to parse YAML config: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// A required field is missing or empty
    #[error("missing required config field: {0}")]
    MissingField(&'static str),

    /// Invalid node role
    #[error("node.role must be 'active' or 'passive', got '{0}'")]
    InvalidRole(String),

    /// Invalid validator supervision mode
    #[error("validator.mode must be 'binary', 'docker', or 'docker-compose', got '{0}'")]
    InvalidMode(String),

    /// The peer list must contain exactly one entry
    #[error("exactly one peer must be configured, got {0}")]
    PeerCount(usize),

    /// Invalid log level
    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    /// A duration or count field is out of range
    #[error("invalid {name}: {message}")]
    InvalidValue {
        name: &'static str,
        message: String,
    },

    /// An environment override could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnvValue { key: String, value: String },
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
