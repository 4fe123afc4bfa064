//! HTTP surface for airq-relay
//!
//! - `GET /health` liveness
//! - `GET /build_info` build identification
//! - `GET /events` SSE stream of every EventBus event
//! - `GET /readings/latest` last reading per pollutant

pub mod buildinfo;
pub mod health;
pub mod readings;
pub mod server;
pub mod sse;

use airq_common::events::EventBus;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::sink::BroadcastSink;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Bus the poller and sink emit on
    pub bus: Arc<EventBus>,
    /// Sink holding the last reading per pollutant
    pub sink: Arc<BroadcastSink>,
}

impl AppState {
    pub fn new(bus: Arc<EventBus>, sink: Arc<BroadcastSink>) -> Self {
        Self { bus, sink }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::health_routes())
        .merge(buildinfo::buildinfo_routes())
        .merge(sse::sse_routes())
        .merge(readings::readings_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
