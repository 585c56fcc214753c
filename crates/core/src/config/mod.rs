//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (FOLIO_*)
//! 2. TOML config file (if FOLIO_CONFIG_FILE set)
//! 3. Built-in defaults

use std::collections::BTreeMap;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Operator override for a single origin's rate limit.
///
/// A `limit` of 0 disables throttling for the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub limit: u32,
    pub window_ms: u64,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (FOLIO_*)
/// 2. TOML config file (if FOLIO_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string sent with every provider request.
    ///
    /// Set via FOLIO_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-attempt HTTP timeout in milliseconds.
    ///
    /// Set via FOLIO_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of retries after the first attempt for retryable failures.
    ///
    /// Set via FOLIO_RETRIES environment variable.
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Base delay for exponential backoff between attempts.
    ///
    /// Set via FOLIO_RETRY_DELAY_MS environment variable.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Response cache time-to-live in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Entry count above which expired cache entries are swept.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Payloads whose serialized form reaches this many characters are not cached.
    #[serde(default = "default_cache_max_chars")]
    pub cache_max_chars: usize,

    /// Per-host rate limit overrides, merged over the built-in table.
    ///
    /// Set in TOML as `[rate_limits."api.crossref.org"]`. Not read from the
    /// environment.
    #[serde(default)]
    pub rate_limits: BTreeMap<String, RateLimitConfig>,

    /// Google Books API key (optional, raises quota).
    #[serde(default)]
    pub google_books_api_key: Option<String>,

    /// TMDb v4 read access token, sent as a bearer header.
    #[serde(default)]
    pub tmdb_access_token: Option<String>,

    /// TMDb v3 API key, used when no access token is set.
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// OMDb API key (required by every OMDb call).
    #[serde(default)]
    pub omdb_api_key: Option<String>,

    /// Contact address for the Crossref polite pool.
    #[serde(default)]
    pub crossref_mailto: Option<String>,
}

fn default_user_agent() -> String {
    "folio/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_cache_ttl_secs() -> u64 {
    3_600
}

fn default_cache_max_entries() -> usize {
    1_000
}

fn default_cache_max_chars() -> usize {
    100_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            cache_max_chars: default_cache_max_chars(),
            rate_limits: BTreeMap::new(),
            google_books_api_key: None,
            tmdb_access_token: None,
            tmdb_api_key: None,
            omdb_api_key: None,
            crossref_mailto: None,
        }
    }
}

fn is_rate_limit_key(key: &str) -> bool {
    key.to_ascii_lowercase().starts_with("rate_limits")
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base backoff delay as Duration.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// `rate_limits` is keyed by host name and hosts contain dots, which the
    /// env provider would split into nested keys. It is read from TOML only;
    /// `FOLIO_RATE_LIMITS*` variables are ignored with a warning.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `FOLIO_`
    /// 2. TOML file from `FOLIO_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("FOLIO_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("FOLIO_")
                .ignore(&["CONFIG_FILE"])
                .filter(|key| !is_rate_limit_key(key.as_str()))
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );
        for (key, _) in std::env::vars().filter(|(key, _)| {
            key.strip_prefix("FOLIO_").is_some_and(is_rate_limit_key)
        }) {
            tracing::warn!(%key, "rate_limits can only be set in the TOML config file; ignoring");
        }

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check if the OMDb API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the OMDb API key is not set.
    pub fn require_omdb_api_key(&self) -> Result<&str, ConfigError> {
        self.omdb_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "omdb_api_key".into(),
                hint: "Set FOLIO_OMDB_API_KEY environment variable".into(),
            })
    }
}
