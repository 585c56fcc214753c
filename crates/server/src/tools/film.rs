//! TMDb and OMDb tools.

use folio_client::providers::omdb::{LookupRequest, MediaType, Plot, SearchRequest};
use folio_client::providers::tmdb::MovieSearchRequest;
use folio_client::{OmdbClient, TmdbClient};
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{json_result, parse_choice, provider_error};

/// Input parameters for film_tmdb_search_movie.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TmdbSearchParams {
    pub query: String,
    /// Release year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Response language, e.g. "en-US".
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub include_adult: Option<bool>,
}

/// TMDb ids arrive as numbers or strings.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum MovieId {
    Number(u64),
    Text(String),
}

impl MovieId {
    fn as_path(&self) -> String {
        match self {
            MovieId::Number(id) => id.to_string(),
            MovieId::Text(id) => id.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TmdbMovieParams {
    /// TMDb movie id.
    pub id: MovieId,
    /// Comma-separated sub-requests, e.g. "credits,videos".
    #[serde(default)]
    pub append_to_response: Option<String>,
}

/// Input parameters for film_omdb_search.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct OmdbSearchParams {
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    /// "movie", "series" or "episode".
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
}

/// Input parameters for film_omdb_get. Needs imdb_id or title.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct OmdbGetParams {
    /// IMDb id, e.g. tt0078748.
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    /// "short" or "full".
    #[serde(default)]
    pub plot: Option<String>,
}

pub async fn tmdb_search_impl(client: &TmdbClient, params: TmdbSearchParams) -> Result<CallToolResult, McpError> {
    let request = MovieSearchRequest {
        query: params.query,
        year: params.year,
        language: params.language,
        page: params.page,
        include_adult: params.include_adult,
    };
    let payload = client.search_movie(&request).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn tmdb_movie_impl(client: &TmdbClient, params: TmdbMovieParams) -> Result<CallToolResult, McpError> {
    let payload = client
        .movie(&params.id.as_path(), params.append_to_response.as_deref())
        .await
        .map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn omdb_search_impl(client: &OmdbClient, params: OmdbSearchParams) -> Result<CallToolResult, McpError> {
    let request = SearchRequest {
        title: params.title,
        year: params.year,
        media_type: parse_choice::<MediaType>(params.media_type.as_deref())?,
        page: params.page,
    };
    let payload = client.search(&request).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}

pub async fn omdb_get_impl(client: &OmdbClient, params: OmdbGetParams) -> Result<CallToolResult, McpError> {
    let request = LookupRequest {
        imdb_id: params.imdb_id,
        title: params.title,
        year: params.year,
        plot: parse_choice::<Plot>(params.plot.as_deref())?,
    };
    let payload = client.lookup(&request).await.map_err(provider_error)?;
    Ok(json_result(&payload))
}
