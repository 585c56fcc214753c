//! Request URL construction shared by the cache and the rate limiter.

use std::collections::BTreeMap;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a provider base URL, assuming https when no scheme is given.
///
/// Hosts come back lowercased and fragments are dropped. Only http(s) is
/// accepted.
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if input.contains("://") {
        url::Url::parse(input)
    } else {
        url::Url::parse(&format!("https://{input}"))
    }
    .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    if parsed.host_str().is_none() {
        return Err(UrlError::InvalidUrl(format!("missing host: {input}")));
    }
    parsed.set_fragment(None);

    Ok(parsed)
}

/// Resolve a base URL and query parameters into the request URL.
///
/// Parameters already on the base are kept unless `query` names them too.
/// Empty values are dropped and the result is sorted by key, so the same
/// request always resolves to the same string.
pub fn resolve(base: &str, query: &BTreeMap<String, String>) -> Result<url::Url, UrlError> {
    let mut url = canonicalize(base)?;

    let mut pairs: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
    pairs.extend(query.iter().map(|(k, v)| (k.clone(), v.clone())));
    pairs.retain(|_, v| !v.is_empty());

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&pairs);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_canonicalize_default_scheme() {
        let url = canonicalize("openlibrary.org/search.json").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("openlibrary.org"));
    }

    #[test]
    fn test_canonicalize_lowercase_host() {
        let url = canonicalize("https://API.OpenAlex.ORG/works").unwrap();
        assert_eq!(url.host_str(), Some("api.openalex.org"));
    }

    #[test]
    fn test_canonicalize_remove_fragment() {
        let url = canonicalize("https://example.com/path#section").unwrap();
        assert_eq!(url.fragment(), None);
        assert_eq!(url.path(), "/path");
    }

    #[test]
    fn test_canonicalize_unsupported_scheme() {
        let result = canonicalize("file:///etc/passwd");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }

    #[test]
    fn test_canonicalize_empty() {
        assert!(matches!(canonicalize("   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_sorts_and_skips_empty() {
        let url = resolve("https://openlibrary.org/search.json", &query(&[("title", "dune"), ("author", ""), ("limit", "5")]))
            .unwrap();
        assert_eq!(url.as_str(), "https://openlibrary.org/search.json?limit=5&title=dune");
    }

    #[test]
    fn test_resolve_is_order_independent() {
        let a = resolve("https://api.crossref.org/works?rows=5", &query(&[("query", "graph")])).unwrap();
        let b = resolve("https://api.crossref.org/works", &query(&[("query", "graph"), ("rows", "5")])).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_resolve_encodes_values() {
        let url = resolve("https://www.googleapis.com/books/v1/volumes", &query(&[("q", "intitle:the hobbit")])).unwrap();
        assert_eq!(url.query(), Some("q=intitle%3Athe+hobbit"));
    }

    #[test]
    fn test_resolve_without_query() {
        let url = resolve("https://api.openalex.org/works/W1", &BTreeMap::new()).unwrap();
        assert_eq!(url.query(), None);
    }
}
