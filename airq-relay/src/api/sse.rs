//! SSE event stream

use axum::{
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use std::convert::Infallible;

use super::AppState;

/// GET /events
///
/// Every `AirqEvent` (readings, cycle summaries, fetch failures) as it is
/// emitted. Readings published before the client connected are not replayed;
/// use `/readings/latest` for the current snapshot.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    airq_common::sse::event_bus_sse_stream(&state.bus, "airq-relay")
}

pub fn sse_routes() -> Router<AppState> {
    Router::new().route("/events", get(event_stream))
}
