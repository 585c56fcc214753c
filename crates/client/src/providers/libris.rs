//! LIBRIS (Swedish union catalogue): Xsearch and OAI-PMH harvesting.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use super::{ProviderError, endpoint, options_for, required};
use crate::fetch::{FetchClient, FetchOptions};

pub const DEFAULT_BASE_URL: &str = "https://libris.kb.se";

/// Xsearch output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum XsearchFormat {
    #[default]
    Json,
    Marcxml,
    Mods,
    Rdf,
    Ris,
}

impl FromStr for XsearchFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(XsearchFormat::Json),
            "marcxml" => Ok(XsearchFormat::Marcxml),
            "mods" => Ok(XsearchFormat::Mods),
            "rdf" => Ok(XsearchFormat::Rdf),
            "ris" => Ok(XsearchFormat::Ris),
            other => Err(format!("invalid format: {other} (expected json, marcxml, mods, rdf or ris)")),
        }
    }
}

/// Parameters for `/xsearch`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct XsearchRequest {
    /// Xsearch query, e.g. `tit:(röda rummet) forf:(strindberg)`.
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<u32>,
    pub format: XsearchFormat,
}

/// OAI-PMH `ListRecords` arguments.
///
/// A resumption token is exclusive: when present, the other arguments are
/// not sent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRecordsRequest {
    pub metadata_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resumption_token: Option<String>,
}

impl Default for ListRecordsRequest {
    fn default() -> Self {
        Self { metadata_prefix: "oai_dc".into(), from: None, until: None, set: None, resumption_token: None }
    }
}

#[derive(Debug, Clone)]
pub struct LibrisClient {
    fetch: FetchClient,
    base_url: String,
}

impl LibrisClient {
    pub fn new(fetch: FetchClient) -> Self {
        Self { fetch, base_url: DEFAULT_BASE_URL.into() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn xsearch(&self, request: &XsearchRequest) -> Result<Value, ProviderError> {
        required("query", &request.query)?;
        let url = endpoint(&self.base_url, &["xsearch"])?;
        Ok(self.fetch.fetch(&url, options_for(request)).await?)
    }

    /// Harvest records; the XML response is returned as a JSON string.
    pub async fn oai_list_records(&self, request: &ListRecordsRequest) -> Result<Value, ProviderError> {
        let url = endpoint(&self.base_url, &["api", "oaipmh", ""])?;
        let options = match request.resumption_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => FetchOptions::new().query("resumptionToken", token),
            None => options_for(request),
        };
        Ok(self.fetch.fetch(&url, options.query("verb", "ListRecords")).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::testing::RecordingTransport;

    #[tokio::test]
    async fn test_xsearch_defaults_to_json() {
        let (fetch, transport) = RecordingTransport::client(r#"{"xsearch": {"list": []}}"#);
        let client = LibrisClient::new(fetch);

        let request = XsearchRequest { query: "tit:(hemsöborna)".into(), n: Some(5), ..Default::default() };
        client.xsearch(&request).await.unwrap();

        let url = transport.last().url;
        assert_eq!(url.path(), "/xsearch");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("format".to_string(), "json".to_string()),
                ("n".to_string(), "5".to_string()),
                ("query".to_string(), "tit:(hemsöborna)".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_records() {
        let (fetch, transport) = RecordingTransport::client("{}");
        let client = LibrisClient::new(fetch);

        let request = ListRecordsRequest { from: Some("2024-01-01".into()), ..Default::default() };
        client.oai_list_records(&request).await.unwrap();

        let url = transport.last().url;
        assert_eq!(url.path(), "/api/oaipmh/");
        assert_eq!(url.query(), Some("from=2024-01-01&metadataPrefix=oai_dc&verb=ListRecords"));
    }

    #[tokio::test]
    async fn test_resumption_token_is_exclusive() {
        let (fetch, transport) = RecordingTransport::client("{}");
        let client = LibrisClient::new(fetch);

        let request = ListRecordsRequest {
            from: Some("2024-01-01".into()),
            resumption_token: Some("abc123".into()),
            ..Default::default()
        };
        client.oai_list_records(&request).await.unwrap();

        assert_eq!(transport.last().url.query(), Some("resumptionToken=abc123&verb=ListRecords"));
    }
}
