//! Provider clients for folio.
//!
//! This crate provides the resilient fetch pipeline (rate limiting, response
//! caching, retries), one client per bibliographic or film API, response
//! summaries, and the aggregated cross-provider searches used by the server.

pub mod aggregate;
pub mod fetch;
pub mod format;
pub mod providers;

pub use aggregate::{
    AggregateSummary, AggregatedResponse, BookCriteria, BookSearch, BookSearchOptions, ScholarlyCriteria,
    ScholarlySearch, ScholarlySearchOptions,
};
pub use fetch::{FetchClient, FetchError, FetchOptions, FetchSettings, RateLimiter};
pub use providers::{
    CrossrefClient, GoogleBooksClient, LibrisClient, OmdbClient, OpenAlexClient, OpenLibraryClient, ProviderError,
    TmdbClient,
};
