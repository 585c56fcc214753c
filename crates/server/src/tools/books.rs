//! Open Library and Google Books tools.

use folio_client::providers::google_books::{OrderBy, VolumesRequest};
use folio_client::providers::openlibrary::SearchRequest;
use folio_client::{GoogleBooksClient, OpenLibraryClient};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{check_max, invalid_input, json_result, parse_choice, provider_error};

/// Input parameters for books_openlibrary_search.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct OpenLibrarySearchParams {
    /// Free-text query.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Page number (1-based).
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    /// Comma-separated list of fields to return.
    #[serde(default)]
    pub fields: Option<String>,
    /// Sort order, e.g. "new" or "rating".
    #[serde(default)]
    pub sort: Option<String>,
    /// Two-letter language code (ISO 639-1).
    #[serde(default)]
    pub lang: Option<String>,
}

/// An Open Library identifier.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct OlidParams {
    /// OLID, bare (OL27448W) or with its /works/ or /books/ prefix.
    pub olid: String,
}

/// Input parameters for books_google_search.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GoogleSearchParams {
    /// Query; supports intitle:, inauthor:, isbn:, inpublisher: and subject:.
    pub q: String,
    #[serde(default)]
    pub start_index: Option<u32>,
    /// Results per page (1-40).
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub lang_restrict: Option<String>,
    /// "all", "books" or "magazines".
    #[serde(default)]
    pub print_type: Option<String>,
    /// "relevance" or "newest".
    #[serde(default)]
    pub order_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct VolumeParams {
    /// Google Books volume id.
    pub id: String,
}

pub async fn openlibrary_search_impl(
    client: &OpenLibraryClient, params: OpenLibrarySearchParams,
) -> Result<CallToolResult, McpError> {
    if let Some(lang) = params.lang.as_deref()
        && lang.chars().count() != 2
    {
        return Err(invalid_input(format!("lang must be a two-letter code, got {lang}")));
    }

    let request = SearchRequest {
        q: params.q,
        title: params.title,
        author: params.author,
        page: params.page,
        limit: params.limit,
        fields: params.fields,
        sort: params.sort,
        lang: params.lang,
    };
    let payload = client.search(&request).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn openlibrary_work_impl(client: &OpenLibraryClient, params: OlidParams) -> Result<CallToolResult, McpError> {
    let payload = client.work(&params.olid).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn openlibrary_edition_impl(
    client: &OpenLibraryClient, params: OlidParams,
) -> Result<CallToolResult, McpError> {
    let payload = client.edition(&params.olid).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn google_search_impl(
    client: &GoogleBooksClient, params: GoogleSearchParams,
) -> Result<CallToolResult, McpError> {
    check_max("max_results", params.max_results, 40)?;
    let order_by = parse_choice::<OrderBy>(params.order_by.as_deref())?;

    let request = VolumesRequest {
        q: params.q,
        start_index: params.start_index,
        max_results: params.max_results,
        lang_restrict: params.lang_restrict,
        print_type: params.print_type,
        order_by,
    };
    let payload = client.search_volumes(&request).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn google_volume_impl(client: &GoogleBooksClient, params: VolumeParams) -> Result<CallToolResult, McpError> {
    let payload = client.volume(&params.id).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}
