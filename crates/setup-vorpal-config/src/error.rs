//! Error types for input loading and validation.

use thiserror::Error;

/// Errors returned while loading or validating action inputs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading an input file failed.
    #[error("failed to read inputs: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing an input file failed.
    #[error("failed to parse inputs: {0}")]
    ParseFailed(#[from] json5::Error),
    /// Converting JSON values failed.
    #[error("failed to decode inputs: {0}")]
    DecodeFailed(#[from] serde_json::Error),
    /// A specific input failed validation.
    #[error("invalid input '{name}': {message}")]
    InvalidField { name: String, message: String },
}
