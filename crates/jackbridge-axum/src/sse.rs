//! SSE framing of service notifications.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::future;
use futures_util::stream::{Stream, StreamExt};
use jackbridge_runtime::Subscription;
use tokio_util::sync::CancellationToken;

/// Keep-alive ping period, short enough for common proxy idle timeouts.
const KEEP_ALIVE: Duration = Duration::from_secs(30);

/// Turn a subscription into an SSE response.
///
/// Each event's `data` is the JSON-encoded notification. The stream ends when
/// `shutdown` fires so graceful shutdown is not held open by clients.
pub fn notification_stream(
    subscription: Subscription,
    shutdown: CancellationToken,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let stream = subscription
        .into_stream()
        .take_until(shutdown.cancelled_owned())
        .filter_map(|event| {
            future::ready(match serde_json::to_string(&event) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(e) => {
                    tracing::warn!("Failed to serialize notification: {}", e);
                    None
                }
            })
        });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE).text("ping"))
}
