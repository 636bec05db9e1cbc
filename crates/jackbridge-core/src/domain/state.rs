//! Managed service state and the per-poll liveness observation.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Believed state of the managed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    /// No live process behind the pid file.
    Stopped,
    /// The pid file names a live process.
    Running,
}

impl ServiceState {
    /// Map a probe result onto a state.
    #[must_use]
    pub const fn from_running(is_running: bool) -> Self {
        if is_running { Self::Running } else { Self::Stopped }
    }

    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
        }
    }
}

/// Result of a single poll cycle.
///
/// Produced by the poll loop, consumed once by the tracker, then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessObservation {
    /// When the probe completed.
    pub observed_at: DateTime<Utc>,
    /// Whether the pid file referenced a live process.
    pub is_running: bool,
}

impl LivenessObservation {
    /// Observation stamped with the current time.
    #[must_use]
    pub fn now(is_running: bool) -> Self {
        Self {
            observed_at: Utc::now(),
            is_running,
        }
    }

    /// The state this observation implies.
    #[must_use]
    pub const fn state(&self) -> ServiceState {
        ServiceState::from_running(self.is_running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_from_probe_result() {
        assert_eq!(ServiceState::from_running(true), ServiceState::Running);
        assert_eq!(ServiceState::from_running(false), ServiceState::Stopped);
        assert!(ServiceState::Running.is_running());
        assert!(!ServiceState::Stopped.is_running());
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&ServiceState::Running).unwrap();
        assert_eq!(json, "\"running\"");
        assert_eq!(ServiceState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn observation_implies_state() {
        let obs = LivenessObservation::now(true);
        assert_eq!(obs.state(), ServiceState::Running);
        assert!(obs.observed_at <= Utc::now());
    }
}
