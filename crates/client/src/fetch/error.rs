//! Fetch error types and retry classification.

use std::time::Duration;

/// HTTP statuses worth another attempt.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Error bodies are cut to this many characters in error messages.
pub const MAX_ERROR_BODY_CHARS: usize = 400;

/// Errors from a provider request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Non-2xx response.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Connection could not be established or was dropped.
    #[error("network error: {0}")]
    Network(String),

    /// Attempt did not complete within the timeout.
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// A 2xx body that could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Build a status error with the body truncated for the message.
    pub fn status(status: u16, url: &str, body: &str) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown");
        let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        FetchError::Status { status, message: format!("HTTP {status} {reason} - {url} - {body}") }
    }

    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => RETRYABLE_STATUSES.contains(status),
            FetchError::Parse(_) | FetchError::InvalidUrl(_) => false,
        }
    }
}

impl From<FetchError> for folio_core::Error {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidUrl(msg) => folio_core::Error::InvalidUrl(msg),
            other => folio_core::Error::FetchFailed(other.to_string()),
        }
    }
}
