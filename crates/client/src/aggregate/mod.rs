//! Concurrent multi-provider searches.
//!
//! # Pipeline
//!
//! 1. Validate the criteria; nothing is sent when no search field is given
//! 2. Fan out one request per enabled provider with
//!    [`futures_util::future::join_all`]
//! 3. Record each provider's payload or error message, in provider order
//! 4. Post-process (deduplication for books, summaries for scholarly works)
//!
//! A failing provider never aborts its siblings.

pub mod books;
pub mod scholarly;

use std::fmt::Display;
use std::future::Future;

use folio_core::SourceResult;
use serde::Serialize;
use serde_json::Value;

use crate::providers::ProviderError;

pub use books::{BookCriteria, BookSearch, BookSearchOptions};
pub use scholarly::{ScholarlyCriteria, ScholarlySearch, ScholarlySearchOptions, ScholarlySource};

/// Success and failure counts over the providers queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    pub total_sources: usize,
    pub successful_sources: usize,
    pub error_sources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplication_applied: Option<bool>,
}

/// Response of an aggregated search.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedResponse<C> {
    pub search_criteria: C,
    pub search_results: Vec<SourceResult>,
    pub summary: AggregateSummary,
}

impl<C> AggregatedResponse<C> {
    pub fn new(search_criteria: C, search_results: Vec<SourceResult>, deduplication_applied: Option<bool>) -> Self {
        let successful_sources = search_results.iter().filter(|r| r.is_success()).count();
        let summary = AggregateSummary {
            total_sources: search_results.len(),
            successful_sources,
            error_sources: search_results.len() - successful_sources,
            deduplication_applied,
        };
        Self { search_criteria, search_results, summary }
    }
}

/// Query every source concurrently and wait for all of them.
///
/// Results come back in the order of `sources`, not completion order.
pub(crate) async fn fan_out<S, F, Fut>(sources: Vec<S>, query: F) -> Vec<SourceResult>
where
    S: Copy + Display,
    F: Fn(S) -> Fut,
    Fut: Future<Output = Result<Value, ProviderError>>,
{
    let futures = sources.into_iter().map(|source| {
        let request = query(source);
        async move {
            match request.await {
                Ok(payload) => {
                    tracing::debug!(%source, "provider returned results");
                    SourceResult::success(source.to_string(), payload)
                }
                Err(err) => {
                    tracing::warn!(%source, error = %err, "provider query failed");
                    SourceResult::failure(source.to_string(), err.to_string())
                }
            }
        }
    });

    futures_util::future::join_all(futures).await
}

/// Require `value` to lie in `range`.
pub(crate) fn check_range<T>(name: &str, value: T, range: std::ops::RangeInclusive<T>) -> Result<(), ProviderError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ProviderError::InvalidInput(format!(
            "{name} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

/// Some non-blank string.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_keeps_source_order() {
        let results = fan_out(vec!["slow", "fast", "broken"], |source| async move {
            match source {
                "slow" => {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(json!({"from": "slow"}))
                }
                "fast" => Ok(json!({"from": "fast"})),
                _ => Err(ProviderError::Fetch(FetchError::status(503, "https://example.org/", "down"))),
            }
        })
        .await;

        let names: Vec<&str> = results.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(names, ["slow", "fast", "broken"]);
        assert!(results[0].is_success());
        assert_eq!(results[2].error.as_deref(), Some("HTTP 503 Service Unavailable - https://example.org/ - down"));
    }

    #[test]
    fn test_summary_counts() {
        let response = AggregatedResponse::new(
            json!({}),
            vec![SourceResult::success("OpenAlex", json!({})), SourceResult::failure("Crossref", "HTTP 500")],
            None,
        );
        assert_eq!(
            response.summary,
            AggregateSummary { total_sources: 2, successful_sources: 1, error_sources: 1, deduplication_applied: None }
        );
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["summary"].get("deduplication_applied").is_none());
    }

    #[test]
    fn test_check_range() {
        assert!(check_range("max_results_per_source", 5, 1..=20).is_ok());
        assert!(check_range("max_results_per_source", 0, 1..=20).is_err());
        assert!(check_range("similarity_threshold", 0.05, 0.1..=1.0).is_err());
    }

    #[test]
    fn test_present() {
        assert_eq!(present(&Some(" dune ".into())), Some("dune"));
        assert_eq!(present(&Some("   ".into())), None);
        assert_eq!(present(&None), None);
    }
}
