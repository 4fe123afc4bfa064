//! Latest readings snapshot

use airq_common::Reading;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

#[derive(Debug, Serialize)]
pub struct LatestReadingsResponse {
    pub readings: Vec<Reading>,
    pub count: usize,
}

/// GET /readings/latest
pub async fn latest_readings(State(state): State<AppState>) -> Json<LatestReadingsResponse> {
    let readings = state.sink.latest().await;
    Json(LatestReadingsResponse {
        count: readings.len(),
        readings,
    })
}

pub fn readings_routes() -> Router<AppState> {
    Router::new().route("/readings/latest", get(latest_readings))
}
