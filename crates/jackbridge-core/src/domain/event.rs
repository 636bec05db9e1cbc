//! Transition notifications broadcast to subscribers.
//!
//! # Wire Format
//!
//! Events are serialized with a `type` tag for client compatibility:
//!
//! ```json
//! { "type": "serverStarted", "at": 1760876400000 }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::ServiceState;

/// A confirmed state transition of the managed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notification {
    /// `Stopped -> Running` was observed.
    #[serde(rename = "serverStarted")]
    Started,
    /// `Running -> Stopped` was observed.
    #[serde(rename = "serverStopped")]
    Stopped,
}

impl Notification {
    /// The notification announcing entry into `state`.
    #[must_use]
    pub const fn entering(state: ServiceState) -> Self {
        match state {
            ServiceState::Running => Self::Started,
            ServiceState::Stopped => Self::Stopped,
        }
    }

    /// State the service is in after this transition.
    #[must_use]
    pub const fn resulting_state(self) -> ServiceState {
        match self {
            Self::Started => ServiceState::Running,
            Self::Stopped => ServiceState::Stopped,
        }
    }
}

/// Notification plus the time of the observation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeEvent {
    #[serde(rename = "type")]
    pub kind: Notification,
    /// Unix timestamp in milliseconds of the confirming observation.
    pub at: i64,
}

impl BridgeEvent {
    #[must_use]
    pub fn new(kind: Notification, observed_at: DateTime<Utc>) -> Self {
        Self {
            kind,
            at: observed_at.timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entering_maps_both_directions() {
        assert_eq!(
            Notification::entering(ServiceState::Running),
            Notification::Started
        );
        assert_eq!(
            Notification::entering(ServiceState::Stopped),
            Notification::Stopped
        );
        assert_eq!(
            Notification::Started.resulting_state(),
            ServiceState::Running
        );
    }

    #[test]
    fn event_serialization() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let event = BridgeEvent::new(Notification::Started, at);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"serverStarted\""));
        assert!(json.contains("\"at\":1700000000123"));

        let back: BridgeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
