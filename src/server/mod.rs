//! HTTP entry points
//!
//! - `POST /api/clone` clones one page and answers with JSON
//! - `POST /api/clone-site` crawls a site and answers with a zip archive
//!
//! CORS is fully permissive, so browser preflights get an empty 200.

mod handlers;

pub use handlers::{clone_page, clone_site_archive, CloneRequest, CloneResponse, SiteCloneRequest};

use crate::config::Config;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::Result;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Shared by every request
pub struct AppState {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher>,
}

impl AppState {
    /// State backed by a real `HttpFetcher`
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.fetcher)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, fetcher }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/clone", post(clone_page))
        .route("/api/clone-site", post(clone_site_archive))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `config.server.bind` and serves until the process exits
pub async fn serve(config: Config) -> Result<()> {
    let listener = TcpListener::bind(config.server.bind.as_str()).await?;
    let state = Arc::new(AppState::new(config)?);
    serve_on(listener, state).await
}

/// Serves on an already bound listener
pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> Result<()> {
    tracing::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
