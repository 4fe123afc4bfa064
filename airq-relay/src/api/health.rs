//! Liveness endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Connected SSE clients
    pub subscribers: usize,
    /// Pollutants with at least one published reading
    pub pollutants_seen: usize,
}

/// GET /health
///
/// Always `ok` while the process serves requests; the counters show whether
/// readings are flowing and anyone is listening.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: "airq-relay",
        version: env!("CARGO_PKG_VERSION"),
        subscribers: state.bus.subscriber_count(),
        pollutants_seen: state.sink.latest().await.len(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
