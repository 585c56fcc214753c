//! HTTP transport seam.
//!
//! `FetchClient` owns caching, rate limiting and retries; a `Transport` only
//! performs one GET and reports what came back.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;

use super::FetchError;

/// Maximum number of redirects followed by the reqwest transport.
const MAX_REDIRECTS: usize = 5;

/// One outgoing GET.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: url::Url,
    pub headers: Vec<(String, String)>,
    pub timeout: Duration,
}

/// A delivered response, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| ct.contains("json"))
    }
}

/// Something that can issue a GET.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform one request. Non-2xx statuses are returned as responses,
    /// only failures to get a response at all are errors.
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Production transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| FetchError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        let mut builder = self
            .http
            .get(request.url.as_str())
            .timeout(request.timeout)
            .header(reqwest::header::ACCEPT, "application/json, text/xml;q=0.9, */*;q=0.8");
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() { FetchError::Timeout(request.timeout) } else { FetchError::Network(e.to_string()) }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(request.timeout)
            } else {
                FetchError::Network(format!("failed to read response: {e}"))
            }
        })?;

        Ok(HttpResponse { status, content_type, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_new() {
        assert!(ReqwestTransport::new("folio/0.1", Duration::from_secs(20)).is_ok());
    }

    #[test]
    fn test_response_classification() {
        let response = HttpResponse {
            status: 200,
            content_type: Some("application/json; charset=utf-8".into()),
            body: Bytes::from_static(b"{}"),
        };
        assert!(response.is_success());
        assert!(response.is_json());

        let response = HttpResponse { status: 404, content_type: Some("text/xml".into()), body: Bytes::new() };
        assert!(!response.is_success());
        assert!(!response.is_json());
    }
}
