//! Error types for Compass Flux
//!
//! Analysis itself never fails: every derivation returns a well-typed, possibly empty
//! result. Errors only surface at the boundaries (parsing input, parsing a granularity,
//! validating configuration, encoding output).

use thiserror::Error;

/// Errors that can occur at the engine boundary
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse activity payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid granularity '{0}': expected one of minute, hour, day, week, month, year")]
    InvalidGranularity(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
