//! Book search across Google Books, Open Library and LIBRIS.

use folio_core::linkage::{self, DEFAULT_SIMILARITY_THRESHOLD, Source};
use serde::Serialize;
use serde_json::Value;

use super::{AggregatedResponse, check_range, fan_out, present};
use crate::providers::ProviderError;
use crate::providers::google_books::{GoogleBooksClient, VolumesRequest};
use crate::providers::libris::{LibrisClient, XsearchRequest};
use crate::providers::openlibrary::{OpenLibraryClient, SearchRequest};

/// What to look for. At least one field other than `language` must be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl BookCriteria {
    pub fn has_search_field(&self) -> bool {
        [&self.title, &self.author, &self.isbn, &self.publisher, &self.subject]
            .into_iter()
            .any(|field| present(field).is_some())
            || self.publication_year.is_some()
    }

    /// Google Books `q`, e.g. `intitle:dune inauthor:herbert`.
    pub fn google_query(&self) -> String {
        [
            ("intitle:", &self.title),
            ("inauthor:", &self.author),
            ("isbn:", &self.isbn),
            ("inpublisher:", &self.publisher),
            ("subject:", &self.subject),
        ]
        .into_iter()
        .filter_map(|(prefix, field)| present(field).map(|v| format!("{prefix}{v}")))
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// LIBRIS Xsearch query, e.g. `tit:(röda rummet) forf:(strindberg)`.
    pub fn libris_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(title) = present(&self.title) {
            parts.push(format!("tit:({title})"));
        }
        if let Some(author) = present(&self.author) {
            parts.push(format!("forf:({author})"));
        }
        if let Some(isbn) = present(&self.isbn) {
            parts.push(format!("isbn:{isbn}"));
        }
        if let Some(publisher) = present(&self.publisher) {
            parts.push(format!("forl:({publisher})"));
        }
        if let Some(subject) = present(&self.subject) {
            parts.push(format!("amne:({subject})"));
        }
        if let Some(year) = self.publication_year {
            parts.push(format!("ar:{year}"));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookSearchOptions {
    pub max_results_per_source: u32,
    pub include_google_books: bool,
    pub include_open_library: bool,
    pub include_libris: bool,
    pub deduplicate_results: bool,
    pub similarity_threshold: f64,
}

impl Default for BookSearchOptions {
    fn default() -> Self {
        Self {
            max_results_per_source: 5,
            include_google_books: true,
            include_open_library: true,
            include_libris: true,
            deduplicate_results: true,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl BookSearchOptions {
    fn sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|source| match source {
                Source::GoogleBooks => self.include_google_books,
                Source::OpenLibrary => self.include_open_library,
                Source::Libris => self.include_libris,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct BookSearch {
    google: GoogleBooksClient,
    open_library: OpenLibraryClient,
    libris: LibrisClient,
}

impl BookSearch {
    pub fn new(google: GoogleBooksClient, open_library: OpenLibraryClient, libris: LibrisClient) -> Self {
        Self { google, open_library, libris }
    }

    /// Query every enabled provider concurrently, then optionally merge
    /// duplicates across them.
    pub async fn search(
        &self, criteria: &BookCriteria, options: &BookSearchOptions,
    ) -> Result<AggregatedResponse<BookCriteria>, ProviderError> {
        if !criteria.has_search_field() {
            return Err(ProviderError::InvalidInput(
                "at least one of title, author, isbn, publisher, subject or publication_year is required".into(),
            ));
        }
        check_range("max_results_per_source", options.max_results_per_source, 1..=20)?;
        check_range("similarity_threshold", options.similarity_threshold, 0.1..=1.0)?;

        let limit = options.max_results_per_source;
        let results = fan_out(options.sources(), |source| self.query(source, criteria, limit)).await;

        let results = if options.deduplicate_results {
            let deduplicated = linkage::deduplicate(results, options.similarity_threshold);
            tracing::debug!(
                clusters = deduplicated.clusters.len(),
                removed = deduplicated.removed_duplicates(),
                "deduplicated book results"
            );
            deduplicated.results
        } else {
            results
        };

        Ok(AggregatedResponse::new(criteria.clone(), results, Some(options.deduplicate_results)))
    }

    async fn query(&self, source: Source, criteria: &BookCriteria, limit: u32) -> Result<Value, ProviderError> {
        match source {
            Source::GoogleBooks => {
                let q = criteria.google_query();
                if q.is_empty() {
                    return Err(ProviderError::InvalidInput(
                        "Google Books needs a title, author, isbn, publisher or subject".into(),
                    ));
                }
                let request = VolumesRequest {
                    q,
                    max_results: Some(limit),
                    lang_restrict: present(&criteria.language).map(str::to_string),
                    ..Default::default()
                };
                self.google.search_volumes(&request).await
            }
            Source::OpenLibrary => {
                let year_query = criteria.publication_year.map(|y| format!("first_publish_year:{y}"));
                let request = SearchRequest {
                    q: present(&criteria.subject)
                        .or(present(&criteria.publisher))
                        .map(str::to_string)
                        .or(year_query),
                    title: present(&criteria.title).map(str::to_string),
                    author: present(&criteria.author).map(str::to_string),
                    limit: Some(limit),
                    ..Default::default()
                };
                self.open_library.search(&request).await
            }
            Source::Libris => {
                let request = XsearchRequest { query: criteria.libris_query(), n: Some(limit), ..Default::default() };
                self.libris.xsearch(&request).await
            }
        }
    }
}
