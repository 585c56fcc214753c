//! Request builders for the upstream catalogues.
//!
//! Each client holds a shared [`FetchClient`](crate::FetchClient), its base
//! URL and whatever credentials the provider takes. Clients only build
//! requests; caching, rate limiting and retries happen in the fetch layer.

pub mod crossref;
pub mod google_books;
pub mod libris;
pub mod omdb;
pub mod openalex;
pub mod openlibrary;
pub mod tmdb;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::fetch::{FetchError, FetchOptions};

pub use crossref::CrossrefClient;
pub use google_books::GoogleBooksClient;
pub use libris::LibrisClient;
pub use omdb::OmdbClient;
pub use openalex::OpenAlexClient;
pub use openlibrary::OpenLibraryClient;
pub use tmdb::TmdbClient;

/// Errors from a provider call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The request went out and failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A credential the provider requires is not configured.
    #[error("{provider} requires an API key: {hint}")]
    MissingApiKey { provider: &'static str, hint: &'static str },

    /// Arguments rejected before any request was made.
    #[error("{0}")]
    InvalidInput(String),
}

impl From<ProviderError> for folio_core::Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Fetch(e) => e.into(),
            ProviderError::MissingApiKey { .. } => folio_core::Error::MissingApiKey(err.to_string()),
            ProviderError::InvalidInput(msg) => folio_core::Error::InvalidInput(msg),
        }
    }
}

/// Append percent-encoded path segments to a base URL.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<String, FetchError> {
    let mut url = url::Url::parse(base).map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(format!("{base}: cannot be a base")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.to_string())
}

/// Fetch options whose query holds the serialized fields of `request`.
///
/// Absent fields are skipped; scalars are rendered without quotes.
pub(crate) fn options_for<T: Serialize>(request: &T) -> FetchOptions {
    let query = match serde_json::to_value(request) {
        Ok(Value::Object(fields)) => fields
            .into_iter()
            .filter_map(|(key, value)| query_value(value).map(|v| (key, v)))
            .collect(),
        _ => BTreeMap::new(),
    };
    FetchOptions { query, ..FetchOptions::default() }
}

fn query_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Trim and reject empty required arguments.
pub(crate) fn required<'a>(name: &str, value: &'a str) -> Result<&'a str, ProviderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ProviderError::InvalidInput(format!("{name} cannot be empty")))
    } else {
        Ok(trimmed)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared transport double for provider tests.

    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use bytes::Bytes;

    use crate::fetch::{FetchClient, FetchError, FetchSettings, HttpRequest, HttpResponse, Transport};

    /// Answers every request with the same JSON body and records it.
    #[derive(Debug, Default)]
    pub struct RecordingTransport {
        pub requests: Mutex<Vec<HttpRequest>>,
        pub body: &'static str,
    }

    impl RecordingTransport {
        pub fn client(body: &'static str) -> (FetchClient, Arc<Self>) {
            let transport = Arc::new(Self { requests: Mutex::default(), body });
            let client = FetchClient::new(transport.clone(), FetchSettings::default());
            (client, transport)
        }

        pub fn last(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }

        pub fn count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(HttpResponse {
                status: 200,
                content_type: Some("application/json".into()),
                body: Bytes::from_static(self.body.as_bytes()),
            })
        }
    }
}
