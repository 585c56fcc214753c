//! Crossref works search and DOI lookup.
//!
//! Requests carry an explicit `User-Agent` (still cacheable) and the
//! configured `mailto` so they land in Crossref's polite pool.

use serde::Serialize;
use serde_json::Value;

use super::{ProviderError, endpoint, options_for, required};
use crate::fetch::{FetchClient, FetchOptions};

pub const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

/// Parameters for `/works`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorksRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(rename = "query.bibliographic", skip_serializing_if = "Option::is_none")]
    pub query_bibliographic: Option<String>,
    #[serde(rename = "query.author", skip_serializing_if = "Option::is_none")]
    pub query_author: Option<String>,
    /// Crossref filter expression, e.g. `from-pub-date:2020-01-01`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CrossrefClient {
    fetch: FetchClient,
    base_url: String,
    user_agent: String,
    mailto: Option<String>,
}

impl CrossrefClient {
    pub fn new(fetch: FetchClient, user_agent: impl Into<String>, mailto: Option<String>) -> Self {
        Self {
            fetch,
            base_url: DEFAULT_BASE_URL.into(),
            user_agent: user_agent.into(),
            mailto: mailto.filter(|m| !m.is_empty()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search_works(&self, request: &WorksRequest) -> Result<Value, ProviderError> {
        let url = endpoint(&self.base_url, &["works"])?;
        Ok(self.fetch.fetch(&url, self.polite(options_for(request))).await?)
    }

    pub async fn work_by_doi(&self, doi: &str) -> Result<Value, ProviderError> {
        let doi = required("doi", doi)?;
        let url = endpoint(&self.base_url, &["works", doi])?;
        Ok(self.fetch.fetch(&url, self.polite(FetchOptions::new())).await?)
    }

    fn polite(&self, options: FetchOptions) -> FetchOptions {
        options
            .header("User-Agent", self.user_agent.as_str())
            .query_opt("mailto", self.mailto.as_deref())
    }
}
