//! Error taxonomy.
//!
//! Every fallible operation in the crate returns [`ApiError`]. Variants
//! classify by what the caller can do about it: a missing path or run id,
//! bad configuration, a remote provider failure (retryable), a lifecycle
//! violation, or an underlying I/O error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A path, run identifier, or other referenced resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The mapping provider call failed; the run stays retryable.
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    /// The operation is not valid for the run's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Filesystem error outside the per-entry rename results.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::RemoteCall("request timed out".to_string())
        } else {
            ApiError::RemoteCall(err.to_string())
        }
    }
}
