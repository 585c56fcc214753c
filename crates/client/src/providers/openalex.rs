//! OpenAlex works search and lookup.

use serde::Serialize;
use serde_json::Value;

use super::{ProviderError, endpoint, options_for, required};
use crate::fetch::{FetchClient, FetchOptions};

pub const DEFAULT_BASE_URL: &str = "https://api.openalex.org";

/// Parameters for `/works`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorksRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// OpenAlex filter expression, e.g. `publication_year:2020,is_oa:true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

const OPENALEX_HOSTS: [&str; 2] = ["api.openalex.org", "openalex.org"];

#[derive(Debug, Clone)]
pub struct OpenAlexClient {
    fetch: FetchClient,
    base_url: String,
}

impl OpenAlexClient {
    pub fn new(fetch: FetchClient) -> Self {
        Self { fetch, base_url: DEFAULT_BASE_URL.into() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search_works(&self, request: &WorksRequest) -> Result<Value, ProviderError> {
        let url = endpoint(&self.base_url, &["works"])?;
        Ok(self.fetch.fetch(&url, options_for(request)).await?)
    }

    /// Fetch a work by id (`W2741809807`) or OpenAlex URI.
    ///
    /// URIs are reduced to their trailing id and always fetched from the
    /// configured base URL.
    pub async fn work(&self, id: &str) -> Result<Value, ProviderError> {
        let id = required("id", id)?;
        let id = if id.starts_with("http") { work_id_from_uri(id)? } else { id.to_string() };
        let url = endpoint(&self.base_url, &["works", id.as_str()])?;
        Ok(self.fetch.fetch(&url, FetchOptions::new()).await?)
    }
}

fn work_id_from_uri(uri: &str) -> Result<String, ProviderError> {
    let invalid = |reason: &str| ProviderError::InvalidInput(format!("{reason}: {uri}"));
    let parsed = url::Url::parse(uri).map_err(|_| invalid("not a valid OpenAlex URI"))?;
    if !matches!(parsed.host_str(), Some(host) if OPENALEX_HOSTS.contains(&host)) {
        return Err(invalid("only openalex.org work URIs are accepted"));
    }
    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .map(str::to_string)
        .ok_or_else(|| invalid("OpenAlex URI has no work id"))
}
