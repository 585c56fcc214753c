//! OMDb search and lookup. Every call needs an API key.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use super::{ProviderError, options_for, required};
use crate::fetch::FetchClient;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
    Episode,
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(MediaType::Movie),
            "series" => Ok(MediaType::Series),
            "episode" => Ok(MediaType::Episode),
            other => Err(format!("invalid type: {other} (expected movie, series or episode)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Plot {
    Short,
    Full,
}

impl FromStr for Plot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "short" => Ok(Plot::Short),
            "full" => Ok(Plot::Full),
            other => Err(format!("invalid plot: {other} (expected short or full)")),
        }
    }
}

/// Title search (`s=`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchRequest {
    #[serde(rename = "s")]
    pub title: String,
    #[serde(rename = "y", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// Single-title lookup by IMDb id (`i=`) or exact title (`t=`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct LookupRequest {
    #[serde(rename = "i", skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "y", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<Plot>,
}

#[derive(Debug, Clone)]
pub struct OmdbClient {
    fetch: FetchClient,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(fetch: FetchClient, api_key: Option<String>) -> Self {
        Self { fetch, base_url: DEFAULT_BASE_URL.into(), api_key: api_key.filter(|k| !k.is_empty()) }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn search(&self, request: &SearchRequest) -> Result<Value, ProviderError> {
        let key = self.require_key()?;
        required("title", &request.title)?;
        let options = options_for(request).query("apikey", key);
        Ok(self.fetch.fetch(&self.base_url, options).await?)
    }

    pub async fn lookup(&self, request: &LookupRequest) -> Result<Value, ProviderError> {
        let key = self.require_key()?;
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !has(&request.imdb_id) && !has(&request.title) {
            return Err(ProviderError::InvalidInput("either imdb_id or title is required".into()));
        }
        let options = options_for(request).query("apikey", key);
        Ok(self.fetch.fetch(&self.base_url, options).await?)
    }

    fn require_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey { provider: "OMDb", hint: "set FOLIO_OMDB_API_KEY" })
    }
}
