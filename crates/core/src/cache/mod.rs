//! Process-lifetime response cache on an in-memory SQLite database.
//!
//! Entries are keyed by the SHA-256 of the request URL and expire lazily
//! once older than the configured TTL. Writes over the size cap are
//! skipped, and crossing the entry high-water mark triggers a sweep of
//! expired rows.

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod responses;

pub use crate::Error;

pub use connection::{CacheDb, CacheSettings};
