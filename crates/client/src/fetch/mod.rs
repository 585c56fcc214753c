//! Resilient fetch pipeline shared by every provider.
//!
//! ### Request flow
//! 1. Resolve base URL + query (sorted, empty values dropped)
//! 2. Cacheable requests are answered from the response cache when possible
//! 3. Wait for the origin's rate-limit admission
//! 4. Attempt loop: retry timeouts, network failures and 408/429/5xx with
//!    exponential backoff (`delay * 2^attempt`), fail fast on anything else
//! 5. Decode JSON (by content type) or keep the body as text, then cache
//!
//! A request is cacheable when it carries no headers besides `User-Agent`.

pub mod error;
pub mod rate_limit;
pub mod transport;
pub mod url;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use folio_core::{AppConfig, CacheDb};
use serde_json::Value;

pub use error::FetchError;
pub use rate_limit::RateLimiter;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use url::{UrlError, canonicalize, resolve};

/// Client-wide defaults applied when a call does not override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub timeout: Duration,
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self { timeout: Duration::from_millis(20_000), retries: 2, retry_delay: Duration::from_millis(1_000) }
    }
}

impl From<&AppConfig> for FetchSettings {
    fn from(config: &AppConfig) -> Self {
        Self { timeout: config.timeout(), retries: config.retries, retry_delay: config.retry_delay() }
    }
}

/// Per-call request options.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub query: BTreeMap<String, String>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub retries: Option<u32>,
    pub retry_delay: Option<Duration>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    /// Add a query parameter when present.
    pub fn query_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = Some(delay);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether the response may be served from and stored in the cache.
    pub fn is_cacheable(&self) -> bool {
        self.headers
            .iter()
            .all(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
    }
}

/// Classified result of one attempt.
#[derive(Debug)]
enum AttemptOutcome {
    Success(Value),
    Retryable(FetchError),
    Fatal(FetchError),
}

impl From<Result<Value, FetchError>> for AttemptOutcome {
    fn from(result: Result<Value, FetchError>) -> Self {
        match result {
            Ok(payload) => AttemptOutcome::Success(payload),
            Err(e) if e.is_retryable() => AttemptOutcome::Retryable(e),
            Err(e) => AttemptOutcome::Fatal(e),
        }
    }
}

/// Cached, rate-limited, retrying HTTP client.
///
/// Clones share the transport, cache and rate limiter.
#[derive(Debug, Clone)]
pub struct FetchClient {
    transport: Arc<dyn Transport>,
    cache: Option<CacheDb>,
    limiter: Option<Arc<RateLimiter>>,
    settings: FetchSettings,
}

impl FetchClient {
    /// Client over the given transport with no cache and no rate limiting.
    pub fn new(transport: Arc<dyn Transport>, settings: FetchSettings) -> Self {
        Self { transport, cache: None, limiter: None, settings }
    }

    /// Client over reqwest configured from `AppConfig`.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let transport = ReqwestTransport::new(&config.user_agent, config.timeout())?;
        Ok(Self::new(Arc::new(transport), FetchSettings::from(config)))
    }

    pub fn with_cache(mut self, cache: CacheDb) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn settings(&self) -> FetchSettings {
        self.settings
    }

    /// GET `base` with `options`, returning decoded JSON or the body as a
    /// JSON string.
    pub async fn fetch(&self, base: &str, options: FetchOptions) -> Result<Value, FetchError> {
        let url = resolve(base, &options.query).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        let cacheable = options.is_cacheable();

        if cacheable && let Some(payload) = self.cached(url.as_str()).await {
            return Ok(payload);
        }

        if let (Some(limiter), Some(origin)) = (&self.limiter, url.host_str()) {
            limiter.admit(origin).await;
        }

        let request = HttpRequest {
            url,
            headers: options.headers,
            timeout: options.timeout.unwrap_or(self.settings.timeout),
        };
        let retries = options.retries.unwrap_or(self.settings.retries);
        let base_delay = options.retry_delay.unwrap_or(self.settings.retry_delay);

        let mut attempt = 0u32;
        loop {
            match AttemptOutcome::from(self.attempt(&request).await) {
                AttemptOutcome::Success(payload) => {
                    if cacheable {
                        self.store(request.url.as_str(), &payload).await;
                    }
                    return Ok(payload);
                }
                AttemptOutcome::Retryable(err) if attempt < retries => {
                    let delay = backoff(base_delay, attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        url = %request.url,
                        error = %err,
                        delay_ms = delay.as_millis() as u64,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                AttemptOutcome::Retryable(err) | AttemptOutcome::Fatal(err) => {
                    tracing::error!(attempts = attempt + 1, url = %request.url, error = %err, "request failed");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<Value, FetchError> {
        let start = tokio::time::Instant::now();
        let response = tokio::time::timeout(request.timeout, self.transport.get(request))
            .await
            .map_err(|_| FetchError::Timeout(request.timeout))??;

        tracing::debug!(
            url = %request.url,
            status = response.status,
            bytes = response.body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );

        if !response.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            return Err(FetchError::status(response.status, request.url.as_str(), &body));
        }

        if response.is_json() {
            serde_json::from_slice(&response.body).map_err(|e| FetchError::Parse(e.to_string()))
        } else {
            Ok(Value::String(String::from_utf8_lossy(&response.body).into_owned()))
        }
    }

    async fn cached(&self, url: &str) -> Option<Value> {
        let cache = self.cache.as_ref()?;
        match cache.lookup(url).await {
            Ok(Some(payload)) => {
                tracing::debug!(url, "cache hit");
                Some(payload)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(url, error = %e, "cache lookup failed");
                None
            }
        }
    }

    async fn store(&self, url: &str, payload: &Value) {
        if let Some(cache) = &self.cache
            && let Err(e) = cache.store(url, payload).await
        {
            tracing::warn!(url, error = %e, "cache store failed");
        }
    }
}

/// `base * 2^attempt`, saturating.
fn backoff(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}
