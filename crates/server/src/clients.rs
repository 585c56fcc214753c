//! Provider clients shared by every tool call.

use folio_client::{
    BookSearch, CrossrefClient, FetchClient, GoogleBooksClient, LibrisClient, OmdbClient, OpenAlexClient,
    OpenLibraryClient, ScholarlySearch, TmdbClient,
};
use folio_core::AppConfig;

/// One client per provider plus the two aggregated searches, all over the
/// same fetch pipeline.
#[derive(Debug, Clone)]
pub struct Clients {
    pub open_library: OpenLibraryClient,
    pub google_books: GoogleBooksClient,
    pub openalex: OpenAlexClient,
    pub crossref: CrossrefClient,
    pub tmdb: TmdbClient,
    pub omdb: OmdbClient,
    pub libris: LibrisClient,
    pub books: BookSearch,
    pub scholarly: ScholarlySearch,
}

impl Clients {
    pub fn new(fetch: FetchClient, config: &AppConfig) -> Self {
        let open_library = OpenLibraryClient::new(fetch.clone());
        let google_books = GoogleBooksClient::new(fetch.clone(), config.google_books_api_key.clone());
        let openalex = OpenAlexClient::new(fetch.clone());
        let crossref = CrossrefClient::new(fetch.clone(), config.user_agent.clone(), config.crossref_mailto.clone());
        let tmdb = TmdbClient::new(fetch.clone(), config.tmdb_access_token.clone(), config.tmdb_api_key.clone());
        let omdb = OmdbClient::new(fetch.clone(), config.omdb_api_key.clone());
        let libris = LibrisClient::new(fetch);
        Self::from_parts(open_library, google_books, openalex, crossref, tmdb, omdb, libris)
    }

    /// Assemble from prebuilt clients; the aggregated searches reuse them.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        open_library: OpenLibraryClient, google_books: GoogleBooksClient, openalex: OpenAlexClient,
        crossref: CrossrefClient, tmdb: TmdbClient, omdb: OmdbClient, libris: LibrisClient,
    ) -> Self {
        let books = BookSearch::new(google_books.clone(), open_library.clone(), libris.clone());
        let scholarly = ScholarlySearch::new(openalex.clone(), crossref.clone());
        Self { open_library, google_books, openalex, crossref, tmdb, omdb, libris, books, scholarly }
    }
}
