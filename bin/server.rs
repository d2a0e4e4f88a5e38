// Subreddit Gallery - Web Server
// Serves the weighted image API over HTTP

use anyhow::{Context, Result};
use subreddit_gallery::{router, Gallery, GalleryConfig, HttpImageSource, VERSION};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "GALLERY_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    tracing::info!(version = VERSION, "starting subreddit gallery");

    let config = GalleryConfig::load()?;
    let source = HttpImageSource::from_config(&config)?;
    tracing::info!(endpoint = source.endpoint(), "using image list endpoint");

    let gallery = Gallery::new(config.clone(), source);
    // fetches land in the registry as they complete; no need to wait here
    gallery.bootstrap();

    let app = router(gallery);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "server running");

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
