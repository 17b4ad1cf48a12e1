use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Storage backend in use.
    pub store: &'static str,
    /// Whether storage is reachable.
    pub store_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheStats>,
}

/// GET /health -- returns service and storage health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_healthy = state.store.ping().await.is_ok();

    let status = if store_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.backend(),
        store_healthy,
        cache: state.cache.as_ref().map(|cache| cache.stats()),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
