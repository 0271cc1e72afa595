//! Domain error types

use thiserror::Error;

/// Rejected duration string such as `"fast"` or `"0s"`
#[derive(Debug, Clone, Error)]
#[error("invalid duration \"{input}\" (use e.g. 300ms, 2s, 1m or 1m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// `Data-Type` value other than `text` or `image`
#[derive(Debug, Clone, Error)]
#[error("unknown clipboard format \"{input}\" (expected text or image)")]
pub struct FormatParseError {
    pub input: String,
}

/// `/timestamp` body that is not a decimal epoch
#[derive(Debug, Clone, Error)]
#[error("invalid server epoch \"{input}\"")]
pub struct EpochParseError {
    pub input: String,
}

/// Failures of the preferences file
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    ReadError(String),

    #[error("malformed config: {0}")]
    ParseError(String),

    #[error("cannot write config: {0}")]
    WriteError(String),

    #[error("bad value for {key}: {message}")]
    ValidationError { key: String, message: String },

    #[error("config already exists at {0}")]
    AlreadyExists(String),
}
