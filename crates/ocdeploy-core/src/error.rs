//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for configuration and context operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Missing or invalid input supplied by the host.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("required variable `{0}` is not defined in any layer")]
    MissingVariable(String),

    #[error("variable layer `{layer}` must be a mapping")]
    LayerNotMapping { layer: &'static str },

    #[error("variable layer `{layer}` uses the reserved key `{key}`")]
    ReservedKey { layer: &'static str, key: String },
}
