//! API Handlers
//!
//! HTTP request handlers for each resolver service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::cache::ImageCache;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, EvictResponse, HealthResponse, ResolveResponse, StatsResponse, SweepResponse,
    UrlQuery,
};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Shared image cache
    pub cache: Arc<ImageCache>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: ImageCache) -> Self {
        Self::from_shared(Arc::new(cache))
    }

    /// Creates a new AppState from a cache that is also held elsewhere.
    pub fn from_shared(cache: Arc<ImageCache>) -> Self {
        Self { cache }
    }
}

/// Handler for GET /resolve
///
/// Resolves a source URL; storage failures still answer 200 with the source.
pub async fn resolve_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<ResolveResponse>> {
    let url = query.source_url().map_err(CacheError::InvalidRequest)?;
    let resolution = state.cache.resolve(url).await;

    Ok(Json(resolution.into()))
}

/// Handler for POST /sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<SweepResponse> {
    Json(state.cache.sweep_expired().await.into())
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    Json(state.cache.clear().await.into())
}

/// Handler for DELETE /cache/entry
pub async fn evict_handler(
    State(state): State<AppState>,
    Query(query): Query<UrlQuery>,
) -> Result<Json<EvictResponse>> {
    let url = query.source_url().map_err(CacheError::InvalidRequest)?;
    let removed = state.cache.evict(url).await?;

    Ok(Json(EvictResponse::new(url, removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(stats, state.cache.ttl_ms()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
