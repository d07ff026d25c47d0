//! Error types for the autoresponder.

use std::path::PathBuf;

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Split error: {0}")]
    Split(#[from] SplitError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Could not determine home directory to expand {0}")]
    NoHomeDir(String),
}

/// Errors reading or writing the last-seen notification marker.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State file {path} does not hold a notification id: {contents:?}")]
    Corrupt { path: PathBuf, contents: String },
}

/// Network client errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Server reported an error on {endpoint}: {message}")]
    Server { endpoint: String, message: String },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Text splitting errors.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    #[error("Prefix of {prefix_len} chars leaves no room in a {max_len}-char post")]
    PrefixTooLong { prefix_len: usize, max_len: usize },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
