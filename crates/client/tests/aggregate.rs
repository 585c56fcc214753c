//! Aggregated searches against mocked provider APIs.

use std::sync::Arc;
use std::time::Duration;

use folio_client::fetch::{FetchClient, FetchSettings, ReqwestTransport};
use folio_client::{
    BookCriteria, BookSearch, BookSearchOptions, CrossrefClient, GoogleBooksClient, LibrisClient, OpenAlexClient,
    OpenLibraryClient, ProviderError, ScholarlyCriteria, ScholarlySearch, ScholarlySearchOptions,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetch_client() -> FetchClient {
    let transport = ReqwestTransport::new("folio-test", Duration::from_secs(5)).unwrap();
    let settings =
        FetchSettings { timeout: Duration::from_secs(5), retries: 1, retry_delay: Duration::from_millis(10) };
    FetchClient::new(Arc::new(transport), settings)
}

fn book_search(server: &MockServer) -> BookSearch {
    let fetch = fetch_client();
    BookSearch::new(
        GoogleBooksClient::new(fetch.clone(), None).with_base_url(format!("{}/books/v1", server.uri())),
        OpenLibraryClient::new(fetch.clone()).with_base_url(server.uri()),
        LibrisClient::new(fetch).with_base_url(server.uri()),
    )
}

fn scholarly_search(server: &MockServer) -> ScholarlySearch {
    let fetch = fetch_client();
    ScholarlySearch::new(
        OpenAlexClient::new(fetch.clone()).with_base_url(server.uri()),
        CrossrefClient::new(fetch, "folio-test", None).with_base_url(server.uri()),
    )
}

async fn mount_hobbit(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/books/v1/volumes"))
        .and(query_param("q", "intitle:The Hobbit inauthor:Tolkien"))
        .and(query_param("maxResults", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalItems": 1,
            "items": [{
                "id": "g1",
                "volumeInfo": {
                    "title": "The Hobbit",
                    "authors": ["J.R.R. Tolkien"],
                    "industryIdentifiers": [{"type": "ISBN_13", "identifier": "9780261102217"}]
                }
            }]
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("title", "The Hobbit"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "numFound": 1,
            "docs": [{
                "key": "/works/OL262758W",
                "title": "The Hobbit",
                "author_name": ["J. R. R. Tolkien"],
                "isbn": ["978-0-261-10221-7"]
            }]
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/xsearch"))
        .and(query_param("query", "tit:(The Hobbit) forf:(Tolkien)"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "xsearch": {
                "records": 1,
                "list": [{"title": "Bilbo : en hobbits äventyr", "creator": "Tolkien, J. R. R."}]
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn hobbit() -> BookCriteria {
    BookCriteria { title: Some("The Hobbit".into()), author: Some("Tolkien".into()), ..Default::default() }
}

#[tokio::test]
async fn test_books_across_all_deduplicates_by_isbn() {
    let server = MockServer::start().await;
    mount_hobbit(&server).await;

    let response = book_search(&server).search(&hobbit(), &BookSearchOptions::default()).await.unwrap();

    assert_eq!(response.summary.total_sources, 3);
    assert_eq!(response.summary.successful_sources, 3);
    assert_eq!(response.summary.deduplication_applied, Some(true));

    let sources: Vec<&str> = response.search_results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(sources, ["Google Books", "Open Library", "LIBRIS (Swedish National Library)"]);

    let google = response.search_results[0].results.as_ref().unwrap();
    assert_eq!(google["items"][0]["id"], "g1");
    assert_eq!(google["deduplication"]["deduplicated_count"], 1);

    let open_library = response.search_results[1].results.as_ref().unwrap();
    assert!(open_library["docs"].as_array().unwrap().is_empty());
    assert_eq!(open_library["deduplication"]["removed_duplicates"], 1);

    let libris = response.search_results[2].results.as_ref().unwrap();
    assert_eq!(libris["xsearch"]["list"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_books_across_all_without_deduplication() {
    let server = MockServer::start().await;
    mount_hobbit(&server).await;

    let options = BookSearchOptions { deduplicate_results: false, ..Default::default() };
    let response = book_search(&server).search(&hobbit(), &options).await.unwrap();

    assert_eq!(response.summary.deduplication_applied, Some(false));
    let open_library = response.search_results[1].results.as_ref().unwrap();
    assert_eq!(open_library["docs"].as_array().unwrap().len(), 1);
    assert!(open_library.get("deduplication").is_none());
}

#[tokio::test]
async fn test_books_across_all_rejects_empty_criteria() {
    let server = MockServer::start().await;

    let criteria = BookCriteria { language: Some("en".into()), ..Default::default() };
    let err = book_search(&server).search(&criteria, &BookSearchOptions::default()).await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidInput(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scholarly_partial_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("search", "transformers"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("query", "transformers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "message": {
                "total-results": 1,
                "items-per-page": 10,
                "items": [{
                    "title": ["Attention Is All You Need"],
                    "author": [{"given": "Ashish", "family": "Vaswani"}],
                    "DOI": "10.48550/arXiv.1706.03762",
                    "published-print": {"date-parts": [[2017, 6, 12]]},
                    "is-referenced-by-count": 100
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = ScholarlyCriteria { query: Some("transformers".into()), ..Default::default() };
    let response =
        scholarly_search(&server).search(&criteria, &ScholarlySearchOptions::default()).await.unwrap();

    assert_eq!(response.summary.successful_sources, 1);
    assert_eq!(response.summary.error_sources, 1);
    assert_eq!(response.summary.deduplication_applied, None);

    let openalex = &response.search_results[0];
    assert_eq!(openalex.source, "OpenAlex");
    let error = openalex.error.as_deref().unwrap();
    assert!(error.starts_with("HTTP 503 Service Unavailable"), "{error}");
    assert!(error.ends_with("maintenance"), "{error}");

    let crossref = response.search_results[1].results.as_ref().unwrap();
    assert_eq!(crossref["message"]["summary_mode"], true);
    assert_eq!(crossref["message"]["items"][0]["title"], "Attention Is All You Need");
    assert_eq!(crossref["message"]["items"][0]["year"], 2017);
}

#[tokio::test]
async fn test_scholarly_single_source() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("filter", "publication_year:2020,is_oa:true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"count": 0, "page": 1, "per_page": 10},
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let criteria =
        ScholarlyCriteria { publication_year: Some(2020), is_open_access: Some(true), ..Default::default() };
    let options = ScholarlySearchOptions { include_crossref: false, ..Default::default() };
    let response = scholarly_search(&server).search(&criteria, &options).await.unwrap();

    assert_eq!(response.summary.total_sources, 1);
    let openalex = response.search_results[0].results.as_ref().unwrap();
    assert_eq!(openalex["meta"]["summary_mode"], true);
}
