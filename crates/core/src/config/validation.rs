//! Bounds checks applied to `AppConfig` after figment has merged every layer.

use std::ops::RangeInclusive;

use crate::config::AppConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn within(field: &str, value: u64, bounds: RangeInclusive<u64>) -> Result<(), ConfigError> {
    if bounds.contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, format!("must be between {} and {}, got {value}", bounds.start(), bounds.end())))
    }
}

impl AppConfig {
    /// Reject values the fetch layer cannot run with.
    ///
    /// Timeouts are bounded to 100ms..=5min, retries to 10 and retry delay
    /// to one minute. Cache bounds must be non-zero. A rate limit override
    /// with a non-zero `limit` needs a non-zero window; `limit = 0` turns
    /// throttling off for that host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        within("timeout_ms", self.timeout_ms, 100..=300_000)?;
        within("retries", u64::from(self.retries), 0..=10)?;
        within("retry_delay_ms", self.retry_delay_ms, 0..=60_000)?;

        let cache_bounds = [
            ("cache_ttl_secs", self.cache_ttl_secs),
            ("cache_max_entries", self.cache_max_entries as u64),
            ("cache_max_chars", self.cache_max_chars as u64),
        ];
        if let Some((field, _)) = cache_bounds.iter().find(|(_, value)| *value == 0) {
            return Err(invalid(*field, "must be greater than 0"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        for (host, limit) in &self.rate_limits {
            match (limit.limit, limit.window_ms) {
                (0, _) => tracing::warn!(%host, "rate limit override of 0 disables throttling for host"),
                (_, 0) => return Err(invalid(format!("rate_limits.{host}"), "window_ms must be greater than 0")),
                _ => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_too_many_retries() {
        let config = AppConfig { retries: 11, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "retries"));
    }

    #[test]
    fn test_validate_zero_cache_ttl() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_rate_limit_zero_window() {
        let mut config = AppConfig::default();
        config
            .rate_limits
            .insert("api.crossref.org".into(), RateLimitConfig { limit: 10, window_ms: 0 });
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "rate_limits.api.crossref.org"));
    }

    #[test]
    fn test_validate_rate_limit_zero_limit_is_unthrottled() {
        let mut config = AppConfig::default();
        config
            .rate_limits
            .insert("libris.kb.se".into(), RateLimitConfig { limit: 0, window_ms: 0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { timeout_ms: 100, retries: 0, retry_delay_ms: 0, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
