//! LIBRIS Xsearch and OAI-PMH tools.

use folio_client::LibrisClient;
use folio_client::providers::libris::{ListRecordsRequest, XsearchFormat, XsearchRequest};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{check_max, parse_choice, provider_error, text_result};

/// Input parameters for se_libris_xsearch.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct XsearchParams {
    /// Xsearch query, e.g. "tit:(röda rummet) forf:(strindberg)".
    pub query: String,
    /// Number of records (1-200).
    #[serde(default)]
    pub n: Option<u32>,
    /// Offset of the first record.
    #[serde(default)]
    pub start: Option<u32>,
    /// "json" (default), "marcxml", "mods", "rdf" or "ris".
    #[serde(default)]
    pub format: Option<String>,
}

/// Input parameters for se_libris_oai_list_records.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OaiListRecordsParams {
    #[serde(default = "default_metadata_prefix")]
    pub metadata_prefix: String,
    /// Lower datestamp bound (YYYY-MM-DD).
    #[serde(default)]
    pub from: Option<String>,
    /// Upper datestamp bound (YYYY-MM-DD).
    #[serde(default)]
    pub until: Option<String>,
    #[serde(default)]
    pub set: Option<String>,
    /// Token from a previous response; all other arguments are ignored.
    #[serde(default)]
    pub resumption_token: Option<String>,
}

fn default_metadata_prefix() -> String {
    "oai_dc".into()
}

pub async fn xsearch_impl(client: &LibrisClient, params: XsearchParams) -> Result<CallToolResult, McpError> {
    check_max("n", params.n, 200)?;
    let request = XsearchRequest {
        query: params.query,
        n: params.n,
        start: params.start,
        format: parse_choice::<XsearchFormat>(params.format.as_deref())?.unwrap_or_default(),
    };
    let payload = client.xsearch(&request).await.map_err(provider_error)?;
    Ok(text_result(payload))
}

/// Harvested XML is returned verbatim.
pub async fn oai_list_records_impl(
    client: &LibrisClient, params: OaiListRecordsParams,
) -> Result<CallToolResult, McpError> {
    let request = ListRecordsRequest {
        metadata_prefix: params.metadata_prefix,
        from: params.from,
        until: params.until,
        set: params.set,
        resumption_token: params.resumption_token,
    };
    let payload = client.oai_list_records(&request).await.map_err(provider_error)?;
    Ok(text_result(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const XML: &str = "<OAI-PMH><ListRecords/></OAI-PMH>";

    #[tokio::test]
    async fn test_oai_returns_xml_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/oaipmh/"))
            .and(query_param("verb", "ListRecords"))
            .and(query_param("metadataPrefix", "oai_dc"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(XML, "text/xml"))
            .expect(1)
            .mount(&server)
            .await;
        let clients = testing::clients(&server.uri());

        let params: OaiListRecordsParams = serde_json::from_str("{}").unwrap();
        let result = oai_list_records_impl(&clients.libris, params).await.unwrap();
        assert_eq!(testing::text(&result), XML);
    }

    #[tokio::test]
    async fn test_xsearch_limits() {
        let server = MockServer::start().await;
        let clients = testing::clients(&server.uri());

        let params = XsearchParams { query: "strindberg".into(), n: Some(500), ..Default::default() };
        let err = xsearch_impl(&clients.libris, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);

        let params = XsearchParams { query: "strindberg".into(), format: Some("csv".into()), ..Default::default() };
        let err = xsearch_impl(&clients.libris, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
    }
}
