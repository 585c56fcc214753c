//! MCP resource templates over the provider lookups.
//!
//! Each template maps a provider-specific URI onto one client call. Record
//! lookups come back as pretty JSON; the LIBRIS OAI harvest stays XML.

use folio_client::providers::libris::{ListRecordsRequest, XsearchRequest};
use folio_client::providers::omdb::LookupRequest;
use rmcp::{ErrorData as McpError, model::*};
use serde_json::{Value, json};

use crate::clients::Clients;
use crate::tools::{invalid_input, provider_error};

const JSON: &str = "application/json";
const XML: &str = "application/xml";

/// Results requested by `libris://xsearch`.
const XSEARCH_LIMIT: u32 = 50;

/// `(uri_template, name, title, description, mime_type)`
const TEMPLATES: &[(&str, &str, &str, &str, &str)] = &[
    ("openlibrary://works/{olid}", "openlibrary-work", "Open Library Work", "Open Library work by OLID.", JSON),
    (
        "openlibrary://editions/{olid}",
        "openlibrary-edition",
        "Open Library Edition",
        "Open Library edition by OLID.",
        JSON,
    ),
    ("googlebooks://volumes/{id}", "googlebooks-volume", "Google Books Volume", "Google Books volume by id.", JSON),
    ("openalex://works/{id}", "openalex-work", "OpenAlex Work", "OpenAlex work by id.", JSON),
    ("crossref://works/{doi}", "crossref-work", "Crossref Work", "Crossref work metadata by DOI.", JSON),
    ("tmdb://movie/{id}", "tmdb-movie", "TMDb Movie", "TMDb movie details by id.", JSON),
    ("omdb://id/{imdbId}", "omdb-by-imdb", "OMDb by IMDb ID", "OMDb movie or series by IMDb id.", JSON),
    ("libris://xsearch?q={query}", "libris-xsearch", "LIBRIS Xsearch", "LIBRIS free-text search (JSON).", JSON),
    (
        "libris://oai/listrecords?prefix={metadataPrefix}&from={from}&until={until}&set={set}",
        "libris-oai-listrecords",
        "LIBRIS OAI-PMH ListRecords",
        "LIBRIS OAI-PMH harvest (XML).",
        XML,
    ),
];

pub fn resource_templates() -> Result<Vec<ResourceTemplate>, McpError> {
    TEMPLATES
        .iter()
        .map(|(uri_template, name, title, description, mime_type)| {
            serde_json::from_value(json!({
                "uriTemplate": uri_template,
                "name": name,
                "title": title,
                "description": description,
                "mimeType": mime_type,
            }))
            .map_err(|e| McpError::internal_error(format!("resource template {name}: {e}"), None))
        })
        .collect()
}

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq)]
enum Resource {
    OpenLibraryWork(String),
    OpenLibraryEdition(String),
    GoogleVolume(String),
    OpenAlexWork(String),
    CrossrefWork(String),
    TmdbMovie(String),
    OmdbById(String),
    LibrisXsearch(String),
    LibrisListRecords { prefix: Option<String>, from: Option<String>, until: Option<String>, set: Option<String> },
}

impl Resource {
    fn parse(uri: &str) -> Result<Self, McpError> {
        let parsed = url::Url::parse(uri).map_err(|e| invalid_input(format!("invalid resource URI {uri}: {e}")))?;
        let kind = parsed.host_str().unwrap_or_default();
        let id = parsed.path().trim_start_matches('/');
        let param = |key: &str| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let with_id = |make: fn(String) -> Resource| {
            if id.is_empty() {
                Err(invalid_input(format!("resource URI is missing an identifier: {uri}")))
            } else {
                Ok(make(id.to_string()))
            }
        };

        match (parsed.scheme(), kind) {
            ("openlibrary", "works") => with_id(Resource::OpenLibraryWork),
            ("openlibrary", "editions") => with_id(Resource::OpenLibraryEdition),
            ("googlebooks", "volumes") => with_id(Resource::GoogleVolume),
            ("openalex", "works") => with_id(Resource::OpenAlexWork),
            ("crossref", "works") => with_id(Resource::CrossrefWork),
            ("tmdb", "movie") => with_id(Resource::TmdbMovie),
            ("omdb", "id") => with_id(Resource::OmdbById),
            ("libris", "xsearch") => param("q")
                .map(Resource::LibrisXsearch)
                .ok_or_else(|| invalid_input(format!("libris://xsearch needs a q parameter: {uri}"))),
            ("libris", "oai") if id == "listrecords" => Ok(Resource::LibrisListRecords {
                prefix: param("prefix"),
                from: param("from"),
                until: param("until"),
                set: param("set"),
            }),
            _ => Err(McpError::resource_not_found(format!("unknown resource: {uri}"), None)),
        }
    }

    fn mime_type(&self) -> &'static str {
        match self {
            Resource::LibrisListRecords { .. } => XML,
            _ => JSON,
        }
    }
}

pub async fn read_resource_impl(clients: &Clients, uri: &str) -> Result<ReadResourceResult, McpError> {
    let resource = Resource::parse(uri)?;
    tracing::debug!(%uri, ?resource, "reading resource");

    let payload = match &resource {
        Resource::OpenLibraryWork(olid) => clients.open_library.work(olid).await,
        Resource::OpenLibraryEdition(olid) => clients.open_library.edition(olid).await,
        Resource::GoogleVolume(id) => clients.google_books.volume(id).await,
        Resource::OpenAlexWork(id) => clients.openalex.work(id).await,
        Resource::CrossrefWork(doi) => clients.crossref.work_by_doi(doi).await,
        Resource::TmdbMovie(id) => clients.tmdb.movie(id, None).await,
        Resource::OmdbById(imdb_id) => {
            let request = LookupRequest { imdb_id: Some(imdb_id.clone()), ..Default::default() };
            clients.omdb.lookup(&request).await
        }
        Resource::LibrisXsearch(query) => {
            let request = XsearchRequest { query: query.clone(), n: Some(XSEARCH_LIMIT), ..Default::default() };
            clients.libris.xsearch(&request).await
        }
        Resource::LibrisListRecords { prefix, from, until, set } => {
            let mut request =
                ListRecordsRequest { from: from.clone(), until: until.clone(), set: set.clone(), ..Default::default() };
            if let Some(prefix) = prefix {
                request.metadata_prefix = prefix.clone();
            }
            clients.libris.oai_list_records(&request).await
        }
    }
    .map_err(provider_error)?;

    let text = match payload {
        Value::String(text) => text,
        other => serde_json::to_string_pretty(&other).unwrap_or_default(),
    };
    let mut contents = ResourceContents::text(text, uri);
    if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
        *mime_type = Some(resource.mime_type().into());
    }
    Ok(ReadResourceResult { contents: vec![contents] })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text_of(result: &ReadResourceResult) -> (String, Option<String>) {
        match &result.contents[0] {
            ResourceContents::TextResourceContents { text, mime_type, .. } => (text.clone(), mime_type.clone()),
            other => panic!("expected text contents, got {other:?}"),
        }
    }

    #[test]
    fn test_templates() {
        let templates = resource_templates().unwrap();
        let uris: Vec<&str> = templates.iter().map(|t| t.raw.uri_template.as_str()).collect();
        assert_eq!(uris.len(), 9);
        assert!(uris.contains(&"openlibrary://works/{olid}"));
        assert!(uris.contains(&"crossref://works/{doi}"));
        assert!(uris.contains(&"libris://xsearch?q={query}"));

        let oai = templates.iter().find(|t| t.raw.name == "libris-oai-listrecords").unwrap();
        assert_eq!(oai.raw.mime_type.as_deref(), Some("application/xml"));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Resource::parse("crossref://works/10.1038/nature12373").unwrap(), Resource::CrossrefWork("10.1038/nature12373".into()));
        assert_eq!(Resource::parse("tmdb://movie/603").unwrap(), Resource::TmdbMovie("603".into()));
        assert_eq!(Resource::parse("libris://xsearch?q=r%C3%B6da+rummet").unwrap(), Resource::LibrisXsearch("röda rummet".into()));
        assert_eq!(
            Resource::parse("libris://oai/listrecords?prefix=marcxml&from=2024-01-01&until=&set=").unwrap(),
            Resource::LibrisListRecords { prefix: Some("marcxml".into()), from: Some("2024-01-01".into()), until: None, set: None }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Resource::parse("openlibrary://works/").unwrap_err().code.0, -32602);
        assert_eq!(Resource::parse("libris://xsearch").unwrap_err().code.0, -32602);
        assert_eq!(Resource::parse("not a uri").unwrap_err().code.0, -32602);
        assert_eq!(Resource::parse("imdb://title/tt0111161").unwrap_err().code, ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_read_openlibrary_work() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/works/OL27448W.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "The Lord of the Rings"})))
            .expect(1)
            .mount(&server)
            .await;
        let clients = testing::clients(&server.uri());

        let result = read_resource_impl(&clients, "openlibrary://works/OL27448W").await.unwrap();
        let (text, mime_type) = text_of(&result);
        assert_eq!(text, "{\n  \"title\": \"The Lord of the Rings\"\n}");
        assert_eq!(mime_type.as_deref(), Some("application/json"));
    }

    #[tokio::test]
    async fn test_read_oai_list_records_is_xml() {
        const BODY: &str = "<OAI-PMH><ListRecords/></OAI-PMH>";
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/oaipmh/"))
            .and(query_param("verb", "ListRecords"))
            .and(query_param("metadataPrefix", "marcxml"))
            .and(query_param("set", "bib"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(BODY, "text/xml"))
            .expect(1)
            .mount(&server)
            .await;
        let clients = testing::clients(&server.uri());

        let result = read_resource_impl(&clients, "libris://oai/listrecords?prefix=marcxml&set=bib").await.unwrap();
        let (text, mime_type) = text_of(&result);
        assert_eq!(text, BODY);
        assert_eq!(mime_type.as_deref(), Some("application/xml"));
    }

    #[tokio::test]
    async fn test_read_omdb_without_key_makes_no_request() {
        let server = MockServer::start().await;
        let clients = testing::clients(&server.uri());

        let err = read_resource_impl(&clients, "omdb://id/tt0111161").await.unwrap_err();
        assert_eq!(err.code.0, -32009);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
