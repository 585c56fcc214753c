//! Shared building blocks for the folio MCP server.
//!
//! `cache` holds fetched provider payloads for the life of the process and
//! `linkage` merges the same record reported by several providers. `config`
//! and `error` are used by every crate in the workspace.

pub mod cache;
pub mod config;
pub mod error;
pub mod linkage;

pub use cache::{CacheDb, CacheSettings};
pub use config::{AppConfig, ConfigError, RateLimitConfig};
pub use error::Error;
pub use linkage::{Cluster, DeduplicationStats, NormalizedRecord, Source, SourceResult};
