//! Photo Search MCP Server
//!
//! Tag search over the Flickr public photo feed.
//!
//! # Configuration
//! Set `PHOTO_FEED_URL` env var or configure in `~/.binks/photo-search.toml`

use rmcp::{transport::stdio, ServiceExt};

use photo_search_mcp::{init::init_tracing, Config, PhotoSearchMcpServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    tracing::info!("Starting Photo Search MCP Server");

    let config = Config::load()?;
    tracing::info!(
        "Feed URL: {} ({:?} transport)",
        config.feed.base_url,
        config.feed.transport
    );

    let server = PhotoSearchMcpServer::new(config)?;
    let service = server.serve(stdio()).await?;

    tracing::info!("Server running, waiting for requests...");
    service.waiting().await?;

    tracing::info!("Server shutting down");
    Ok(())
}
