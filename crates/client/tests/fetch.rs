//! Fetch pipeline over real HTTP against a mock server.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use folio_client::fetch::{FetchClient, FetchError, FetchOptions, FetchSettings, RateLimiter, ReqwestTransport};
use folio_core::{CacheDb, RateLimitConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(retries: u32) -> FetchClient {
    let transport = ReqwestTransport::new("folio-test", Duration::from_secs(5)).unwrap();
    let settings = FetchSettings { timeout: Duration::from_secs(5), retries, retry_delay: Duration::from_millis(5) };
    FetchClient::new(Arc::new(transport), settings)
}

#[tokio::test]
async fn test_retries_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client(2).fetch(&format!("{}/works", server.uri()), FetchOptions::new()).await.unwrap();
    assert_eq!(payload, json!({"results": []}));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volumes/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/volumes/missing", server.uri());
    let err = client(3).fetch(&url, FetchOptions::new()).await.unwrap_err();
    assert_eq!(
        err,
        FetchError::Status { status: 404, message: format!("HTTP 404 Not Found - {url} - not found") }
    );
}

#[tokio::test]
async fn test_cached_response_skips_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "dune"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"numFound": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let cache = CacheDb::open_in_memory().await.unwrap();
    let fetch = client(0).with_cache(cache.clone());
    let url = format!("{}/search.json", server.uri());

    let first = fetch.fetch(&url, FetchOptions::new().query("q", "dune")).await.unwrap();
    let second = fetch.fetch(&url, FetchOptions::new().query("q", "dune")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(cache.len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_authorized_requests_bypass_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/3/search/movie"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(2)
        .mount(&server)
        .await;

    let cache = CacheDb::open_in_memory().await.unwrap();
    let fetch = client(0).with_cache(cache.clone());
    let url = format!("{}/3/search/movie", server.uri());
    let options = || FetchOptions::new().query("query", "alien").header("Authorization", "Bearer token");

    fetch.fetch(&url, options()).await.unwrap();
    fetch.fetch(&url, options()).await.unwrap();

    assert!(cache.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_text_body_is_returned_as_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/oaipmh/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<OAI-PMH></OAI-PMH>", "text/xml; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let payload = client(0).fetch(&format!("{}/api/oaipmh/", server.uri()), FetchOptions::new()).await.unwrap();
    assert_eq!(payload, json!("<OAI-PMH></OAI-PMH>"));
}

#[tokio::test]
async fn test_rate_limited_client_still_fetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(3)
        .mount(&server)
        .await;

    let limiter = RateLimiter::with_limits([("127.0.0.1".to_string(), RateLimitConfig { limit: 10, window_ms: 1_000 })]);
    let fetch = client(0).with_rate_limiter(Arc::new(limiter));

    for page in 1..=3 {
        let options = FetchOptions::new().query("page", page);
        fetch.fetch(&server.uri(), options).await.unwrap();
    }

    let pairs: BTreeMap<String, String> = server.received_requests().await.unwrap()[2]
        .url
        .query_pairs()
        .into_owned()
        .collect();
    assert_eq!(pairs.get("page").map(String::as_str), Some("3"));
}
