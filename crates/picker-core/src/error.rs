//! Error types for the media picker core.
//!
//! Every fallible operation in this crate returns [`PickerError`]. Status
//! errors from the provider keep the numeric HTTP status so the presentation
//! layer can react to specific codes (rate limiting, auth failures).

use thiserror::Error;

/// Fallback message used when an error body cannot be parsed.
pub const GENERIC_REQUEST_FAILURE: &str = "Request failed";

/// Main error type for the media picker.
#[derive(Debug, Error)]
pub enum PickerError {
    /// The provider (or proxy) answered with a non-success status.
    #[error("Pexels API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for media picker operations.
pub type Result<T> = std::result::Result<T, PickerError>;

impl From<serde_json::Error> for PickerError {
    fn from(err: serde_json::Error) -> Self {
        PickerError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for PickerError {
    fn from(err: reqwest::Error) -> Self {
        PickerError::Network {
            message: err.to_string(),
            cause: err.url().map(|u| u.to_string()),
        }
    }
}

impl PickerError {
    /// HTTP status carried by a status error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            PickerError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error should trigger a retry.
    ///
    /// Transport failures, timeouts, rate limiting and server-side errors
    /// are retried; client errors (bad key, missing resource) are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            PickerError::Network { .. } => true,
            PickerError::Api { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            _ => false,
        }
    }
}
