//! Aggregated search tools.

use folio_client::{
    BookCriteria, BookSearch, BookSearchOptions, ScholarlyCriteria, ScholarlySearch, ScholarlySearchOptions,
};
use folio_core::linkage::DEFAULT_SIMILARITY_THRESHOLD;
use rmcp::{ErrorData as McpError, model::*};
use schemars::JsonSchema;
use serde::Deserialize;

use super::{default_true, json_result, provider_error};

/// Input parameters for books_search_across_all.
///
/// At least one of title, author, isbn, publisher, subject or
/// publication_year is required.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BooksAcrossParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    /// Language code, forwarded to Google Books.
    #[serde(default)]
    pub language: Option<String>,
    /// Results per provider (1-20, default 5).
    #[serde(default = "default_books_per_source")]
    pub max_results_per_source: u32,
    #[serde(default = "default_true")]
    pub include_google_books: bool,
    #[serde(default = "default_true")]
    pub include_open_library: bool,
    #[serde(default = "default_true")]
    pub include_libris: bool,
    /// Merge the same book found by several providers (default true).
    #[serde(default = "default_true")]
    pub deduplicate_results: bool,
    /// Minimum match score for two records to be merged (0.1-1.0, default 0.8).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_books_per_source() -> u32 {
    5
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

/// Input parameters for scholarly_search_across_all.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ScholarlyAcrossParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub doi: Option<String>,
    #[serde(default)]
    pub publication_year: Option<i32>,
    /// Inclusive range, "YYYY-YYYY".
    #[serde(default)]
    pub year_range: Option<String>,
    /// Restrict to the last N years (1-20).
    #[serde(default)]
    pub recent_years: Option<u32>,
    /// OpenAlex only.
    #[serde(default)]
    pub is_open_access: Option<bool>,
    /// OpenAlex only.
    #[serde(default)]
    pub language: Option<String>,
    /// Results per provider (1-20, default 10).
    #[serde(default = "default_works_per_source")]
    pub max_results_per_source: u32,
    #[serde(default = "default_true")]
    pub include_open_alex: bool,
    #[serde(default = "default_true")]
    pub include_crossref: bool,
    /// Return compact per-work summaries (default true).
    #[serde(default = "default_true")]
    pub summary_mode: bool,
}

fn default_works_per_source() -> u32 {
    10
}

pub async fn books_across_impl(search: &BookSearch, params: BooksAcrossParams) -> Result<CallToolResult, McpError> {
    let criteria = BookCriteria {
        title: params.title,
        author: params.author,
        isbn: params.isbn,
        publisher: params.publisher,
        subject: params.subject,
        publication_year: params.publication_year,
        language: params.language,
    };
    let options = BookSearchOptions {
        max_results_per_source: params.max_results_per_source,
        include_google_books: params.include_google_books,
        include_open_library: params.include_open_library,
        include_libris: params.include_libris,
        deduplicate_results: params.deduplicate_results,
        similarity_threshold: params.similarity_threshold,
    };

    let response = search.search(&criteria, &options).await.map_err(provider_error)?;
    tracing::info!(
        successful = response.summary.successful_sources,
        failed = response.summary.error_sources,
        "books search across all providers"
    );
    Ok(json_result(&response))
}

pub async fn scholarly_across_impl(
    search: &ScholarlySearch, params: ScholarlyAcrossParams,
) -> Result<CallToolResult, McpError> {
    let criteria = ScholarlyCriteria {
        query: params.query,
        title: params.title,
        author: params.author,
        doi: params.doi,
        publication_year: params.publication_year,
        year_range: params.year_range,
        recent_years: params.recent_years,
        is_open_access: params.is_open_access,
        language: params.language,
    };
    let options = ScholarlySearchOptions {
        max_results_per_source: params.max_results_per_source,
        include_open_alex: params.include_open_alex,
        include_crossref: params.include_crossref,
        summary_mode: params.summary_mode,
    };

    let response = search.search(&criteria, &options).await.map_err(provider_error)?;
    tracing::info!(
        successful = response.summary.successful_sources,
        failed = response.summary.error_sources,
        "scholarly search across all providers"
    );
    Ok(json_result(&response))
}
