//! Cross-source record linkage.
//!
//! Turns per-provider book result lists into one deduplicated set:
//!
//! 1. [`normalize`] projects each provider item onto title/authors/ISBN
//! 2. [`similarity`] scores pairs of normalized records in `[0, 1]`
//! 3. [`cluster`] groups records greedily around seed records and elects a
//!    canonical member by source priority
//! 4. [`dedup`] rebuilds the per-provider payloads from the canonical members
//!
//! Everything here is total: malformed items are skipped, never reported as
//! errors.

pub mod cluster;
pub mod dedup;
pub mod normalize;
pub mod similarity;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use cluster::{Cluster, DEFAULT_SIMILARITY_THRESHOLD, build_clusters};
pub use dedup::{Deduplicated, DeduplicationStats, deduplicate};
pub use normalize::{NormalizedRecord, normalize, normalize_isbn, normalize_text};
pub use similarity::{score, string_similarity};

/// Book providers the linkage engine knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    GoogleBooks,
    OpenLibrary,
    Libris,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::GoogleBooks, Source::OpenLibrary, Source::Libris];

    /// Display name used as the `source` field of aggregated results.
    pub fn name(self) -> &'static str {
        match self {
            Source::GoogleBooks => "Google Books",
            Source::OpenLibrary => "Open Library",
            Source::Libris => "LIBRIS (Swedish National Library)",
        }
    }

    /// Resolve a display name back to a known source.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Canonical-selection priority; higher wins.
    pub fn priority(self) -> u8 {
        match self {
            Source::GoogleBooks => 3,
            Source::OpenLibrary => 2,
            Source::Libris => 1,
        }
    }

    /// Priority for an arbitrary source name; unknown sources rank lowest.
    pub fn priority_of(name: &str) -> u8 {
        Self::from_name(name).map_or(0, Self::priority)
    }

    /// Key of the item array inside this source's search payload.
    pub fn items_key(self) -> &'static str {
        match self {
            Source::GoogleBooks => "items",
            Source::OpenLibrary => "docs",
            Source::Libris => "list",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One provider's outcome inside an aggregated search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceResult {
    /// Provider display name.
    pub source: String,
    /// Raw or formatted payload; null when the provider failed.
    pub results: Option<Value>,
    /// Error message when the provider failed after retries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SourceResult {
    pub fn success(source: impl Into<String>, results: Value) -> Self {
        Self { source: source.into(), results: Some(results), error: None }
    }

    pub fn failure(source: impl Into<String>, error: impl Into<String>) -> Self {
        Self { source: source.into(), results: None, error: Some(error.into()) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
