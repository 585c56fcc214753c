//! The Movie Database search and details.
//!
//! A v4 access token is sent as a bearer header, which makes the request
//! uncacheable. Without one, a v3 key goes in the query string.

use serde::Serialize;
use serde_json::Value;

use super::{ProviderError, endpoint, options_for, required};
use crate::fetch::{FetchClient, FetchOptions};

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Parameters for `/search/movie`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MovieSearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_adult: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    fetch: FetchClient,
    base_url: String,
    access_token: Option<String>,
    api_key: Option<String>,
}

impl TmdbClient {
    pub fn new(fetch: FetchClient, access_token: Option<String>, api_key: Option<String>) -> Self {
        Self {
            fetch,
            base_url: DEFAULT_BASE_URL.into(),
            access_token: access_token.filter(|t| !t.is_empty()),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search_movie(&self, request: &MovieSearchRequest) -> Result<Value, ProviderError> {
        required("query", &request.query)?;
        let url = endpoint(&self.base_url, &["search", "movie"])?;
        Ok(self.fetch.fetch(&url, self.authorize(options_for(request))).await?)
    }

    /// Movie details, optionally with `append_to_response` sub-requests.
    pub async fn movie(&self, id: &str, append_to_response: Option<&str>) -> Result<Value, ProviderError> {
        let id = required("id", id)?;
        let url = endpoint(&self.base_url, &["movie", id])?;
        let options = FetchOptions::new().query_opt("append_to_response", append_to_response);
        Ok(self.fetch.fetch(&url, self.authorize(options)).await?)
    }

    fn authorize(&self, options: FetchOptions) -> FetchOptions {
        match (&self.access_token, &self.api_key) {
            (Some(token), _) => options.header("Authorization", format!("Bearer {token}")),
            (None, Some(key)) => options.query("api_key", key),
            (None, None) => options,
        }
    }
}
