//! Huginn error types

use std::time::Duration;

/// Huginn error types
#[derive(Debug, thiserror::Error)]
pub enum HuginnError {
    // Remote/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("not found: {0}")]
    NotFound(String),

    // Data errors
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Pipeline errors
    /// A single candidate could not be scored. The orchestrator drops it and
    /// keeps going.
    #[error("candidate unavailable: {0}")]
    CandidateUnavailable(String),

    #[error("request deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("analysis failed: {0}")]
    Analysis(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl HuginnError {
    /// Whether the error is worth retrying.
    ///
    /// Rate limiting, transport failures, timeouts and 5xx responses are
    /// transient. Everything else (not found, bad payloads, 4xx) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            HuginnError::RateLimited { .. } | HuginnError::Http(_) | HuginnError::Timeout => true,
            HuginnError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server-provided delay hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            HuginnError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HuginnError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HuginnError::Timeout
        } else if err.is_decode() {
            HuginnError::InvalidPayload(err.to_string())
        } else {
            HuginnError::Http(err.to_string())
        }
    }
}

/// Result type alias for Huginn operations
pub type Result<T> = std::result::Result<T, HuginnError>;
