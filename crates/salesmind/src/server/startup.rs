//! REST server startup and configuration

use anyhow::{Context, Result};
use axum::serve;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::server::routing::create_router;
use crate::server::state::AppState;

/// Start the REST server and run until interrupted
pub async fn start_server(config: ServerConfig) -> Result<()> {
  let catalog = config.load_catalog().context("Failed to load product catalog")?;
  tracing::info!(provider = %catalog.provider, sections = catalog.sections.len(), "loaded product catalog");

  let addr = config.bind;
  tracing::info!(database = %config.database_path.display(), "document store opens on first use");
  let state = AppState::new(config, catalog).context("Failed to build HTTP client")?;

  let app = create_router(state)
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {addr}"))?;
  tracing::info!("Server listening on {addr}");

  serve(listener, app).with_graceful_shutdown(shutdown_signal()).await.context("Server error")?;

  tracing::info!("Server shutdown gracefully");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("unable to listen for shutdown signal: {e}");
  }
}
