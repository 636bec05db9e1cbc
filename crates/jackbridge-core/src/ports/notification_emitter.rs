//! Notification emitter port.
//!
//! The poll loop hands confirmed transitions to an emitter; implementations
//! handle the transport (broadcast channel, SSE, logging).

use crate::domain::BridgeEvent;

/// Trait for broadcasting transition events to subscribers.
///
/// # Implementations
///
/// - `NoopEmitter` - For tests and contexts without subscribers
/// - `NotificationBroadcaster` in the runtime crate (bounded per-subscriber buffers)
pub trait NotificationEmitter: Send + Sync {
    /// Broadcast an event.
    ///
    /// Must not block: a slow or absent subscriber may lose events but can
    /// never stall the caller.
    fn emit(&self, event: BridgeEvent);
}

/// A no-op emitter that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl NoopEmitter {
    pub const fn new() -> Self {
        Self
    }
}

impl NotificationEmitter for NoopEmitter {
    fn emit(&self, _event: BridgeEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Notification;
    use chrono::Utc;
    use std::sync::Arc;

    #[test]
    fn test_noop_emitter() {
        let emitter: Arc<dyn NotificationEmitter> = Arc::new(NoopEmitter::new());
        emitter.emit(BridgeEvent::new(Notification::Started, Utc::now()));
    }
}
