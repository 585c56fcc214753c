//! `folio-mcp`: loads configuration, wires the shared fetch client into the
//! provider clients and serves MCP over stdio.
//!
//! stdout carries JSON-RPC only, so logs are written to stderr as JSON.

use std::sync::Arc;

use anyhow::Result;
use folio_client::{FetchClient, RateLimiter};
use folio_core::{AppConfig, CacheDb, CacheSettings};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod clients;
mod handler;
mod resources;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let cache = CacheDb::with_settings(CacheSettings::from(&config)).await?;
    let limiter = Arc::new(RateLimiter::new(&config.rate_limits));
    let fetch = FetchClient::from_config(&config)?
        .with_cache(cache)
        .with_rate_limiter(limiter);

    tracing::info!(
        user_agent = %config.user_agent,
        timeout_ms = config.timeout_ms,
        retries = config.retries,
        "Starting folio server on stdio transport"
    );
    if let Err(e) = config.require_omdb_api_key() {
        tracing::warn!(error = %e, "OMDb tools will fail until a key is configured");
    }

    let handler = handler::FolioServer::new(clients::Clients::new(fetch, &config));
    let running = serve_server(handler, stdio()).await?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "folio server stopped");

    Ok(())
}
