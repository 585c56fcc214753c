//! The `folio` MCP handler: 17 provider tools plus URI-addressed resources.
use std::sync::Arc;

use crate::clients::Clients;
use crate::resources::{read_resource_impl, resource_templates};
use crate::tools::across::{BooksAcrossParams, ScholarlyAcrossParams, books_across_impl, scholarly_across_impl};
use crate::tools::books::{
    GoogleSearchParams, OlidParams, OpenLibrarySearchParams, VolumeParams, google_search_impl, google_volume_impl,
    openlibrary_edition_impl, openlibrary_search_impl, openlibrary_work_impl,
};
use crate::tools::film::{
    OmdbGetParams, OmdbSearchParams, TmdbMovieParams, TmdbSearchParams, omdb_get_impl, omdb_search_impl,
    tmdb_movie_impl, tmdb_search_impl,
};
use crate::tools::libris::{OaiListRecordsParams, XsearchParams, oai_list_records_impl, xsearch_impl};
use crate::tools::scholarly::{
    CrossrefSearchParams, DoiParams, OpenAlexSearchParams, OpenAlexWorkParams, crossref_search_impl,
    crossref_work_impl, openalex_search_impl, openalex_work_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListResourceTemplatesResult, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ReadResourceRequestParam, ReadResourceResult, ServerCapabilities,
        ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

#[derive(Clone)]
pub struct FolioServer {
    clients: Arc<Clients>,
    tool_router: ToolRouter<Self>,
}

/// Tools are thin wrappers; argument checks and provider calls live in `tools`.
#[tool_router]
impl FolioServer {
    pub fn new(clients: Clients) -> Self {
        Self { clients: Arc::new(clients), tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Search Open Library (works by default). Supports q/title/author, pagination, fields, sort and lang."
    )]
    async fn books_openlibrary_search(
        &self, params: Parameters<OpenLibrarySearchParams>,
    ) -> Result<CallToolResult, McpError> {
        openlibrary_search_impl(&self.clients.open_library, params.0).await
    }

    #[tool(description = "Fetch an Open Library work by OLID (e.g. OL27448W).")]
    async fn books_openlibrary_get_work(&self, params: Parameters<OlidParams>) -> Result<CallToolResult, McpError> {
        openlibrary_work_impl(&self.clients.open_library, params.0).await
    }

    #[tool(description = "Fetch an Open Library edition by OLID (e.g. OL7058607M).")]
    async fn books_openlibrary_get_edition(&self, params: Parameters<OlidParams>) -> Result<CallToolResult, McpError> {
        openlibrary_edition_impl(&self.clients.open_library, params.0).await
    }

    #[tool(description = "Search Google Books volumes.")]
    async fn books_google_search(&self, params: Parameters<GoogleSearchParams>) -> Result<CallToolResult, McpError> {
        google_search_impl(&self.clients.google_books, params.0).await
    }

    #[tool(description = "Fetch a single Google Books volume by id.")]
    async fn books_google_get_volume(&self, params: Parameters<VolumeParams>) -> Result<CallToolResult, McpError> {
        google_volume_impl(&self.clients.google_books, params.0).await
    }

    #[tool(description = "Search OpenAlex works (title, abstract and full text).")]
    async fn scholarly_openalex_search_works(
        &self, params: Parameters<OpenAlexSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        openalex_search_impl(&self.clients.openalex, params.0).await
    }

    #[tool(description = "Get an OpenAlex work by id or URI.")]
    async fn scholarly_openalex_get_work(
        &self, params: Parameters<OpenAlexWorkParams>,
    ) -> Result<CallToolResult, McpError> {
        openalex_work_impl(&self.clients.openalex, params.0).await
    }

    #[tool(description = "Search Crossref works with optional filters.")]
    async fn scholarly_crossref_search_works(
        &self, params: Parameters<CrossrefSearchParams>,
    ) -> Result<CallToolResult, McpError> {
        crossref_search_impl(&self.clients.crossref, params.0).await
    }

    #[tool(description = "Fetch Crossref work metadata by DOI.")]
    async fn scholarly_crossref_get_work_by_doi(
        &self, params: Parameters<DoiParams>,
    ) -> Result<CallToolResult, McpError> {
        crossref_work_impl(&self.clients.crossref, params.0).await
    }

    #[tool(description = "Search The Movie Database for movies.")]
    async fn film_tmdb_search_movie(&self, params: Parameters<TmdbSearchParams>) -> Result<CallToolResult, McpError> {
        tmdb_search_impl(&self.clients.tmdb, params.0).await
    }

    #[tool(description = "Get TMDb movie details by id with optional append_to_response.")]
    async fn film_tmdb_get_movie(&self, params: Parameters<TmdbMovieParams>) -> Result<CallToolResult, McpError> {
        tmdb_movie_impl(&self.clients.tmdb, params.0).await
    }

    #[tool(description = "Search OMDb by title, year and type. Requires an OMDb API key.")]
    async fn film_omdb_search(&self, params: Parameters<OmdbSearchParams>) -> Result<CallToolResult, McpError> {
        omdb_search_impl(&self.clients.omdb, params.0).await
    }

    #[tool(description = "Fetch OMDb details by IMDb id or title/year. Requires an OMDb API key.")]
    async fn film_omdb_get(&self, params: Parameters<OmdbGetParams>) -> Result<CallToolResult, McpError> {
        omdb_get_impl(&self.clients.omdb, params.0).await
    }

    #[tool(description = "Search LIBRIS (Swedish union catalogue) using Xsearch; JSON output by default.")]
    async fn se_libris_xsearch(&self, params: Parameters<XsearchParams>) -> Result<CallToolResult, McpError> {
        xsearch_impl(&self.clients.libris, params.0).await
    }

    #[tool(description = "Harvest LIBRIS via OAI-PMH ListRecords. Returns XML; supports resumption_token.")]
    async fn se_libris_oai_list_records(
        &self, params: Parameters<OaiListRecordsParams>,
    ) -> Result<CallToolResult, McpError> {
        oai_list_records_impl(&self.clients.libris, params.0).await
    }

    /// Concurrent book search with cross-provider deduplication.
    #[tool(
        description = "Search Google Books, Open Library and LIBRIS at once. Results found by several providers are merged unless deduplicate_results is false."
    )]
    async fn books_search_across_all(&self, params: Parameters<BooksAcrossParams>) -> Result<CallToolResult, McpError> {
        books_across_impl(&self.clients.books, params.0).await
    }

    #[tool(description = "Search OpenAlex and Crossref at once for academic publications.")]
    async fn scholarly_search_across_all(
        &self, params: Parameters<ScholarlyAcrossParams>,
    ) -> Result<CallToolResult, McpError> {
        scholarly_across_impl(&self.clients.scholarly, params.0).await
    }
}

impl ServerHandler for FolioServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "folio".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().enable_resources().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }

    async fn list_resource_templates(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, rmcp::model::ErrorData> {
        Ok(ListResourceTemplatesResult { meta: None, resource_templates: resource_templates()?, next_cursor: None })
    }

    async fn read_resource(
        &self, request: ReadResourceRequestParam, _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, rmcp::model::ErrorData> {
        read_resource_impl(&self.clients, &request.uri).await
    }
}
