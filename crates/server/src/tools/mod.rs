//! MCP tool implementations.
//!
//! Every tool validates its arguments, calls one provider client (or an
//! aggregated search) and returns the JSON payload pretty-printed as text.
//! Argument errors surface as `INVALID_INPUT` before any request is made.

pub mod across;
pub mod books;
pub mod film;
pub mod libris;
pub mod scholarly;

use std::str::FromStr;

use folio_client::ProviderError;
use folio_core::Error;
use rmcp::{ErrorData as McpError, model::*};
use serde::Serialize;
use serde_json::Value;

/// Pretty-printed JSON as a single text block.
pub(crate) fn json_result(value: &impl Serialize) -> CallToolResult {
    CallToolResult::success(vec![Content::text(serde_json::to_string_pretty(value).unwrap_or_default())])
}

/// Text payloads are returned as-is, anything else as pretty JSON.
pub(crate) fn text_result(value: Value) -> CallToolResult {
    match value {
        Value::String(text) => CallToolResult::success(vec![Content::text(text)]),
        other => json_result(&other),
    }
}

pub(crate) fn provider_error(err: ProviderError) -> McpError {
    Error::from(err).into()
}

pub(crate) fn invalid_input(message: impl Into<String>) -> McpError {
    Error::InvalidInput(message.into()).into()
}

/// Parse an optional string argument into one of its allowed values.
pub(crate) fn parse_choice<T>(value: Option<&str>) -> Result<Option<T>, McpError>
where
    T: FromStr<Err = String>,
{
    value.map(str::parse).transpose().map_err(invalid_input)
}

/// Reject values above `max`.
pub(crate) fn check_max(name: &str, value: Option<u32>, max: u32) -> Result<(), McpError> {
    match value {
        Some(v) if v > max => Err(invalid_input(format!("{name} must be at most {max}, got {v}"))),
        _ => Ok(()),
    }
}

pub(crate) fn default_true() -> bool {
    true
}
