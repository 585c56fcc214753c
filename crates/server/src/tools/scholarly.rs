//! OpenAlex and Crossref tools.

use folio_client::format::{format_crossref, format_openalex};
use folio_client::providers::{crossref, openalex};
use folio_client::{CrossrefClient, OpenAlexClient};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{json_result, provider_error};

/// Input parameters for scholarly_openalex_search_works.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct OpenAlexSearchParams {
    /// Search across title, abstract and full text.
    #[serde(default)]
    pub search: Option<String>,
    /// OpenAlex filter, e.g. "publication_year:2023,is_oa:true".
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    /// Return compact per-work summaries instead of the raw response.
    #[serde(default)]
    pub summary_mode: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OpenAlexWorkParams {
    /// OpenAlex id (W2741809807) or full https://openalex.org/ URI.
    pub id: String,
}

/// Input parameters for scholarly_crossref_search_works.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CrossrefSearchParams {
    /// Free-text query.
    #[serde(default)]
    pub query: Option<String>,
    /// Match against titles and other bibliographic fields.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Crossref filter, e.g. "from-pub-date:2020-01-01,type:journal-article".
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub rows: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
    /// Return compact per-work summaries instead of the raw response.
    #[serde(default)]
    pub summary_mode: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DoiParams {
    /// DOI, e.g. 10.1038/nature14539.
    pub doi: String,
}

pub async fn openalex_search_impl(
    client: &OpenAlexClient, params: OpenAlexSearchParams,
) -> Result<CallToolResult, McpError> {
    let request = openalex::WorksRequest {
        search: params.search,
        filter: params.filter,
        per_page: params.per_page,
        page: params.page,
    };
    let payload = client.search_works(&request).await.map_err(provider_error)?;
    Ok(json_result(&format_openalex(payload, params.summary_mode)))
}

pub async fn openalex_work_impl(client: &OpenAlexClient, params: OpenAlexWorkParams) -> Result<CallToolResult, McpError> {
    let payload = client.work(&params.id).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn crossref_search_impl(
    client: &CrossrefClient, params: CrossrefSearchParams,
) -> Result<CallToolResult, McpError> {
    let request = crossref::WorksRequest {
        query: params.query,
        query_bibliographic: params.title,
        query_author: params.author,
        filter: params.filter,
        rows: params.rows,
        offset: params.offset,
    };
    let payload = client.search_works(&request).await.map_err(provider_error)?;
    Ok(json_result(&format_crossref(payload, params.summary_mode)))
}

pub async fn crossref_work_impl(client: &CrossrefClient, params: DoiParams) -> Result<CallToolResult, McpError> {
    let payload = client.work_by_doi(&params.doi).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_openalex_summary_mode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/works"))
            .and(query_param("search", "protein folding"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": {"count": 1, "page": 1, "per_page": 25},
                "results": [{
                    "id": "https://openalex.org/W1",
                    "display_name": "Highly accurate protein structure prediction",
                    "publication_year": 2021,
                    "doi": "https://doi.org/10.1038/s41586-021-03819-2",
                    "cited_by_count": 10
                }]
            })))
            .mount(&server)
            .await;
        let clients = testing::clients(&server.uri());

        let params =
            OpenAlexSearchParams { search: Some("protein folding".into()), summary_mode: true, ..Default::default() };
        let result = openalex_search_impl(&clients.openalex, params).await.unwrap();

        let output: Value = serde_json::from_str(&testing::text(&result)).unwrap();
        assert_eq!(output["meta"]["summary_mode"], true);
        assert_eq!(output["results"][0]["title"], "Highly accurate protein structure prediction");
        assert_eq!(output["results"][0]["url"], "https://doi.org/10.1038/s41586-021-03819-2");
    }

    #[tokio::test]
    async fn test_crossref_fetch_failure_maps_to_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Resource not found."))
            .expect(1)
            .mount(&server)
            .await;
        let clients = testing::clients(&server.uri());

        let err = crossref_work_impl(&clients.crossref, DoiParams { doi: "10.1000/missing".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code.0, -32008);
        assert!(err.message.contains("HTTP 404 Not Found"));
    }
}
