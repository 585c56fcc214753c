//! Database connection management with pragma configuration.
//!
//! The cache never touches disk: every handle is an in-memory SQLite
//! database that lives as long as the process holding it.

use super::migrations;
use crate::{AppConfig, Error};
use std::time::Duration;
use tokio_rusqlite::Connection;

/// Expiry and sizing policy for the response cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Entries older than this are never returned.
    pub ttl: Duration,
    /// Entry count above which expired entries are swept on store.
    pub max_entries: usize,
    /// Serialized payloads of this many characters or more are not stored.
    pub max_chars: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { ttl: Duration::from_secs(3_600), max_entries: 1_000, max_chars: 100_000 }
    }
}

impl From<&AppConfig> for CacheSettings {
    fn from(config: &AppConfig) -> Self {
        Self { ttl: config.cache_ttl(), max_entries: config.cache_max_entries, max_chars: config.cache_max_chars }
    }
}

/// Cache database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread. Clones share the same database.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
    pub(crate) settings: CacheSettings,
}

impl CacheDb {
    /// Open an in-memory cache with default settings.
    pub async fn open_in_memory() -> Result<Self, Error> {
        Self::with_settings(CacheSettings::default()).await
    }

    /// Open an in-memory cache with the given expiry policy.
    ///
    /// Applies pragmas and runs migrations before returning.
    pub async fn with_settings(settings: CacheSettings) -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;

        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA synchronous=OFF;
                 PRAGMA temp_store=MEMORY;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        tracing::debug!(
            ttl_secs = settings.ttl.as_secs(),
            max_entries = settings.max_entries,
            max_chars = settings.max_chars,
            "opened in-memory response cache"
        );

        Ok(Self { conn, settings })
    }

    /// Expiry policy in effect for this handle.
    pub fn settings(&self) -> CacheSettings {
        self.settings
    }
}
