//! Google Books volume search and lookup.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use super::{ProviderError, endpoint, options_for, required};
use crate::fetch::{FetchClient, FetchOptions};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// Result ordering for volume search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Relevance,
    Newest,
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "relevance" => Ok(OrderBy::Relevance),
            "newest" => Ok(OrderBy::Newest),
            other => Err(format!("invalid orderBy: {other} (expected relevance or newest)")),
        }
    }
}

/// Parameters for `/volumes`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumesRequest {
    /// Full-text query; supports `intitle:`, `inauthor:`, `isbn:` etc.
    pub q: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang_restrict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    fetch: FetchClient,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(fetch: FetchClient, api_key: Option<String>) -> Self {
        Self { fetch, base_url: DEFAULT_BASE_URL.into(), api_key: api_key.filter(|k| !k.is_empty()) }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search_volumes(&self, request: &VolumesRequest) -> Result<Value, ProviderError> {
        required("q", &request.q)?;
        let url = endpoint(&self.base_url, &["volumes"])?;
        let options = options_for(request).query_opt("key", self.api_key.as_deref());
        Ok(self.fetch.fetch(&url, options).await?)
    }

    pub async fn volume(&self, id: &str) -> Result<Value, ProviderError> {
        let id = required("id", id)?;
        let url = endpoint(&self.base_url, &["volumes", id])?;
        let options = FetchOptions::new().query_opt("key", self.api_key.as_deref());
        Ok(self.fetch.fetch(&url, options).await?)
    }
}
