//! Unified error types for folio.
//!
//! Precondition failures (`InvalidInput`, `MissingApiKey`) are raised before
//! any request is issued. `FetchFailed` is only raised once a provider request
//! has failed fatally or exhausted its retry budget.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the folio server.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., no search field given).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A provider credential required for the call is not configured.
    #[error("MISSING_API_KEY: {0}")]
    MissingApiKey(String),

    /// Provider request failed after classification and retries.
    #[error("FETCH_FAILED: {0}")]
    FetchFailed(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Cached payload could not be encoded or decoded.
    #[error("CACHE_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// JSON-RPC error code reported to MCP clients.
    pub fn code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) => -32602,
            Error::MissingApiKey(_) => -32009,
            Error::FetchFailed(_) => -32008,
            Error::InvalidUrl(_) => -32003,
            Error::Database(_) | Error::MigrationFailed(_) | Error::Serialization(_) => -32002,
        }
    }

    /// Message without the category prefix.
    fn detail(&self) -> String {
        match self {
            Error::InvalidInput(msg)
            | Error::MissingApiKey(msg)
            | Error::FetchFailed(msg)
            | Error::InvalidUrl(msg)
            | Error::MigrationFailed(msg) => msg.clone(),
            Error::Database(e) => e.to_string(),
            Error::Serialization(e) => e.to_string(),
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(inner) => inner,
            tokio_rusqlite::Error::Close(close) => Error::Database(tokio_rusqlite::Error::Close(close)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        tokio_rusqlite::Error::Error(err).into()
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        McpError { code: ErrorCode(err.code()), message: err.detail().into(), data: None }
    }
}
