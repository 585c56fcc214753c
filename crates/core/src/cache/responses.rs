//! Response cache operations.
//!
//! Provides lookup and store for provider responses keyed by their
//! fully-resolved request URL.

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::Error;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_rusqlite::params;

impl CacheDb {
    /// Look up a cached response by request URL.
    ///
    /// Returns None if the URL was never stored or its entry is older than
    /// the TTL. Expired entries are deleted as they are encountered.
    pub async fn lookup(&self, url: &str) -> Result<Option<Value>, Error> {
        self.lookup_at(url, Utc::now()).await
    }

    pub(crate) async fn lookup_at(&self, url: &str, now: DateTime<Utc>) -> Result<Option<Value>, Error> {
        let key_hash = compute_cache_key(url);
        let now_ms = now.timestamp_millis();
        let ttl_ms = ttl_millis(self);

        let row = self
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let mut stmt =
                    conn.prepare("SELECT payload_json, stored_at_ms FROM response_cache WHERE key_hash = ?1")?;

                let result = stmt.query_row(params![key_hash], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                });

                match result {
                    Ok((_, stored_at_ms)) if now_ms - stored_at_ms > ttl_ms => {
                        conn.execute("DELETE FROM response_cache WHERE key_hash = ?1", params![key_hash])?;
                        Ok(None)
                    }
                    Ok((json, _)) => Ok(Some(json)),
                    Err(tokio_rusqlite::rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        match row {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Store a response under its request URL.
    ///
    /// Returns false without storing when the serialized payload reaches the
    /// size ceiling. When the entry count passes the high-water mark, every
    /// expired entry is swept.
    pub async fn store(&self, url: &str, value: &Value) -> Result<bool, Error> {
        self.store_at(url, value, Utc::now()).await
    }

    pub(crate) async fn store_at(&self, url: &str, value: &Value, now: DateTime<Utc>) -> Result<bool, Error> {
        let payload_json = serde_json::to_string(value)?;
        let chars = payload_json.chars().count();
        if chars >= self.settings.max_chars {
            tracing::debug!(url, chars, "response too large to cache");
            return Ok(false);
        }

        let key_hash = compute_cache_key(url);
        let url = url.to_string();
        let now_ms = now.timestamp_millis();
        let ttl_ms = ttl_millis(self);
        let max_entries = self.settings.max_entries as i64;

        let swept = self
            .conn
            .call(move |conn| -> Result<usize, Error> {
                conn.execute(
                    "INSERT INTO response_cache (key_hash, url, payload_json, stored_at_ms)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key_hash) DO UPDATE SET
                        url = excluded.url,
                        payload_json = excluded.payload_json,
                        stored_at_ms = excluded.stored_at_ms",
                    params![key_hash, url, payload_json, now_ms],
                )?;

                let count: i64 = conn.query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))?;
                if count <= max_entries {
                    return Ok(0);
                }

                let deleted =
                    conn.execute("DELETE FROM response_cache WHERE ?1 - stored_at_ms > ?2", params![now_ms, ttl_ms])?;
                Ok(deleted)
            })
            .await
            .map_err(Error::from)?;

        if swept > 0 {
            tracing::debug!(swept, "swept expired cache entries");
        }

        Ok(true)
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Whether the cache holds no entries.
    pub async fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len().await? == 0)
    }
}

fn ttl_millis(db: &CacheDb) -> i64 {
    i64::try_from(db.settings.ttl.as_millis()).unwrap_or(i64::MAX)
}
