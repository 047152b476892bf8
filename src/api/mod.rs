//! # HTTP API Module
//!
//! Serves link previews to the URL List front end. Handlers only translate
//! between HTTP and the [`Resolver`]; fallback synthesis happens inside the
//! resolver, so a reachable-but-broken page still yields `200` with a
//! URL-derived preview.
//!
//! ## Routes
//!
//! - `GET /api/metadata?url=<urlencoded>`: one `LinkMetadata`
//! - `POST /api/metadata/batch` with `{"urls": [...]}`: one `PendingUrlState`
//!   per input URL, in input order
//! - `GET /health`: liveness probe

mod error;

pub use error::ApiError;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::error::Result;
use crate::metadata::{Fetch, LinkMetadata, PendingUrlState, Resolver};

/// Maximum number of URLs accepted by the batch endpoint
pub const MAX_BATCH_URLS: usize = 100;

/// Server bind configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    urls: Vec<String>,
}

/// Build the API router around a shared resolver
pub fn router<F>(resolver: Arc<Resolver<F>>) -> Router
where
    F: Fetch + 'static,
{
    Router::new()
        .route("/api/metadata", get(get_metadata::<F>))
        .route("/api/metadata/batch", post(post_metadata_batch::<F>))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(resolver)
}

/// Bind and serve the API until ctrl-c
pub async fn serve<F>(config: &ServerConfig, resolver: Arc<Resolver<F>>) -> Result<()>
where
    F: Fetch + 'static,
{
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    info!(%addr, "serving link metadata api");

    axum::serve(listener, router(resolver))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[instrument(skip_all, fields(url = ?query.url))]
async fn get_metadata<F: Fetch>(
    State(resolver): State<Arc<Resolver<F>>>,
    Query(query): Query<MetadataQuery>,
) -> std::result::Result<Json<LinkMetadata>, ApiError> {
    let url = query
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or(ApiError::MissingUrl)?;

    let metadata = resolver.resolve(&url).await?;
    Ok(Json(metadata))
}

#[instrument(skip_all, fields(count = request.urls.len()))]
async fn post_metadata_batch<F: Fetch>(
    State(resolver): State<Arc<Resolver<F>>>,
    Json(request): Json<BatchRequest>,
) -> std::result::Result<Json<Vec<PendingUrlState>>, ApiError> {
    if request.urls.len() > MAX_BATCH_URLS {
        return Err(ApiError::TooManyUrls {
            max: MAX_BATCH_URLS,
        });
    }

    Ok(Json(resolver.resolve_all(&request.urls).await))
}

async fn health() -> &'static str {
    "ok"
}
