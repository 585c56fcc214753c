//! Per-origin sliding-window rate limiting.
//!
//! Each origin (host) gets its own window of recent admission times. When
//! the window is full, `admit` sleeps until the oldest admission ages out;
//! it never rejects. Admissions to the same origin are serialized by the
//! window's async lock, which is held across the wait.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use folio_core::RateLimitConfig;
use tokio::time::Instant;

const DEFAULT_WINDOW_MS: u64 = 60_000;

/// Built-in limits per 60s window.
const DEFAULT_LIMITS: &[(&str, u32)] = &[
    ("api.crossref.org", 50),
    ("www.googleapis.com", 100),
    ("api.openalex.org", 1000),
    ("www.omdbapi.com", 100),
    ("api.themoviedb.org", 40),
    ("libris.kb.se", 60),
];

#[derive(Debug)]
struct RateWindow {
    limit: usize,
    window: Duration,
    admissions: VecDeque<Instant>,
}

impl RateWindow {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            limit: config.limit as usize,
            window: Duration::from_millis(config.window_ms),
            admissions: VecDeque::with_capacity(config.limit as usize),
        }
    }

    fn evict(&mut self, now: Instant) {
        while let Some(oldest) = self.admissions.front() {
            if now.duration_since(*oldest) >= self.window {
                self.admissions.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Process-wide admission control keyed by origin.
#[derive(Debug, Default)]
pub struct RateLimiter {
    limits: HashMap<String, RateLimitConfig>,
    windows: Mutex<HashMap<String, Arc<tokio::sync::Mutex<RateWindow>>>>,
}

impl RateLimiter {
    /// Built-in table with operator overrides applied on top.
    pub fn new(overrides: &BTreeMap<String, RateLimitConfig>) -> Self {
        let defaults = DEFAULT_LIMITS
            .iter()
            .map(|(host, limit)| (host.to_string(), RateLimitConfig { limit: *limit, window_ms: DEFAULT_WINDOW_MS }));
        Self::with_limits(defaults.chain(overrides.iter().map(|(h, c)| (h.to_lowercase(), *c))))
    }

    /// Only the given limits; every other origin is unthrottled.
    pub fn with_limits(limits: impl IntoIterator<Item = (String, RateLimitConfig)>) -> Self {
        Self { limits: limits.into_iter().collect(), windows: Mutex::default() }
    }

    /// Configured limit for an origin, if it is throttled.
    pub fn limit_for(&self, origin: &str) -> Option<RateLimitConfig> {
        self.limits.get(origin).copied().filter(|c| c.limit > 0 && c.window_ms > 0)
    }

    /// Wait until a request to `origin` may be issued, then record it.
    ///
    /// Returns how long the caller was held back.
    pub async fn admit(&self, origin: &str) -> Duration {
        let Some(window) = self.window_for(origin) else {
            return Duration::ZERO;
        };

        let mut window = window.lock().await;
        let started = Instant::now();
        window.evict(started);

        while window.admissions.len() >= window.limit {
            let Some(oldest) = window.admissions.front().copied() else {
                break;
            };
            let wait = window.window.saturating_sub(Instant::now().duration_since(oldest));
            tracing::debug!(origin, wait_ms = wait.as_millis() as u64, "rate limit reached, waiting");
            tokio::time::sleep(wait).await;
            window.evict(Instant::now());
        }

        window.admissions.push_back(Instant::now());
        started.elapsed()
    }

    fn window_for(&self, origin: &str) -> Option<Arc<tokio::sync::Mutex<RateWindow>>> {
        let config = self.limit_for(origin)?;
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = windows
            .entry(origin.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(RateWindow::new(config))));
        Some(Arc::clone(window))
    }
}
