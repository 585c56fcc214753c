//! Open Library search and work/edition lookup.

use serde::Serialize;
use serde_json::Value;

use super::{ProviderError, endpoint, options_for, required};
use crate::fetch::{FetchClient, FetchOptions};

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

/// Parameters for `/search.json`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Comma-separated field list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// ISO 639-1 language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenLibraryClient {
    fetch: FetchClient,
    base_url: String,
}

impl OpenLibraryClient {
    pub fn new(fetch: FetchClient) -> Self {
        Self { fetch, base_url: DEFAULT_BASE_URL.into() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<Value, ProviderError> {
        let url = endpoint(&self.base_url, &["search.json"])?;
        Ok(self.fetch.fetch(&url, options_for(request)).await?)
    }

    /// Fetch a work by OLID (`OL27448W` or `/works/OL27448W`).
    pub async fn work(&self, olid: &str) -> Result<Value, ProviderError> {
        self.record("works", olid).await
    }

    /// Fetch an edition by OLID (`OL7058607M` or `/books/OL7058607M`).
    pub async fn edition(&self, olid: &str) -> Result<Value, ProviderError> {
        self.record("books", olid).await
    }

    async fn record(&self, kind: &str, olid: &str) -> Result<Value, ProviderError> {
        let olid = required("olid", olid)?;
        let prefix = format!("/{kind}/");
        let id = olid.strip_prefix(&prefix).unwrap_or(olid);
        let url = endpoint(&self.base_url, &[kind, &format!("{id}.json")])?;
        Ok(self.fetch.fetch(&url, FetchOptions::new()).await?)
    }
}
