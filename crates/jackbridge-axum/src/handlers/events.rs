//! SSE events handler - service state notifications.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures_util::stream::Stream;

use crate::state::AppState;

/// SSE events stream endpoint.
///
/// Each connected client is one subscriber; closing the connection
/// unsubscribes.
pub async fn stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    crate::sse::notification_stream(state.controller.subscribe(), state.shutdown.clone())
}
