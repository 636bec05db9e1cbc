//! Notification fan-out to subscribers.
//!
//! Backed by a `tokio::sync::broadcast` channel. Every subscriber reads from
//! its own cursor into a shared ring of `capacity` events: a subscriber that
//! falls behind loses its oldest undelivered events and is told how many it
//! missed, while the sender and all other subscribers are unaffected.

use jackbridge_core::domain::BridgeEvent;
use jackbridge_core::ports::NotificationEmitter;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, warn};

/// Broadcaster for service transition events.
#[derive(Debug, Clone)]
pub struct NotificationBroadcaster {
    sender: broadcast::Sender<BridgeEvent>,
}

impl NotificationBroadcaster {
    /// Create a broadcaster buffering at most `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; settings validation rejects that earlier.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber. It sees only events emitted from now on.
    pub fn subscribe(&self) -> Subscription {
        debug!(
            subscribers = self.sender.receiver_count() + 1,
            "Notification subscriber added"
        );
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationEmitter for NotificationBroadcaster {
    fn emit(&self, event: BridgeEvent) {
        // Only log if there are receivers (avoid spam when nobody listens)
        if self.sender.receiver_count() > 0 {
            debug!(?event, "Broadcasting notification");
            let _ = self.sender.send(event);
        }
    }
}

/// One subscriber's view of the notification stream.
///
/// Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<BridgeEvent>,
}

impl Subscription {
    /// Next event, or `None` once the broadcaster is gone.
    ///
    /// Events lost to overflow are skipped with a warning.
    pub async fn recv(&mut self) -> Option<BridgeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Notification subscriber lagging, dropped oldest events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Convert into a stream with the same overflow handling as [`Self::recv`].
    pub fn into_stream(self) -> impl Stream<Item = BridgeEvent> + Send + 'static {
        BroadcastStream::new(self.receiver).filter_map(|result| match result {
            Ok(event) => Some(event),
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                warn!(missed, "Notification subscriber lagging, dropped oldest events");
                None
            }
        })
    }
}
