//! Transition detection over successive liveness observations.
//!
//! The tracker owns the only mutable [`ServiceState`] in the bridge. It is
//! written exclusively through [`StateTracker::update`] and read through
//! [`StateTracker::current`] or a [`watch::Receiver`]. The value lives inside a
//! `tokio::sync::watch` channel, so compare-and-set in `update` runs under the
//! channel's write lock and readers never see a torn value.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::{LivenessObservation, Notification, ServiceState};

/// Holds the bridge's belief about the managed service.
///
/// The belief starts out unknown (`None`). The first observation establishes
/// the baseline without emitting a notification; afterwards a notification is
/// returned if and only if the observed state differs from the held one.
#[derive(Debug)]
pub struct StateTracker {
    state: watch::Sender<Option<ServiceState>>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    /// Create an unseeded tracker.
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self { state }
    }

    /// Feed one observation; returns the transition it confirms, if any.
    pub fn update(&self, observation: &LivenessObservation) -> Option<Notification> {
        let observed = observation.state();
        let mut notification = None;

        self.state.send_if_modified(|held| match *held {
            None => {
                *held = Some(observed);
                info!(state = %observed, "Initial service state established");
                true
            }
            Some(previous) if previous == observed => false,
            Some(previous) => {
                *held = Some(observed);
                notification = Some(Notification::entering(observed));
                debug!(
                    from = %previous,
                    to = %observed,
                    observed_at = %observation.observed_at,
                    "Service state transition"
                );
                true
            }
        });

        notification
    }

    /// Current belief; `None` until the first observation.
    #[must_use]
    pub fn current(&self) -> Option<ServiceState> {
        *self.state.borrow()
    }

    /// Receiver that sees every committed change of the belief.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Option<ServiceState>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn obs(is_running: bool) -> LivenessObservation {
        LivenessObservation::now(is_running)
    }

    #[test]
    fn first_observation_seeds_without_notification() {
        let tracker = StateTracker::new();
        assert_eq!(tracker.current(), None);

        assert_eq!(tracker.update(&obs(true)), None);
        assert_eq!(tracker.current(), Some(ServiceState::Running));

        let tracker = StateTracker::new();
        assert_eq!(tracker.update(&obs(false)), None);
        assert_eq!(tracker.current(), Some(ServiceState::Stopped));
    }

    #[test]
    fn transitions_emit_exactly_once() {
        let tracker = StateTracker::new();
        tracker.update(&obs(false));

        assert_eq!(tracker.update(&obs(true)), Some(Notification::Started));
        assert_eq!(tracker.update(&obs(true)), None);
        assert_eq!(tracker.current(), Some(ServiceState::Running));

        assert_eq!(tracker.update(&obs(false)), Some(Notification::Stopped));
        assert_eq!(tracker.update(&obs(false)), None);
        assert_eq!(tracker.current(), Some(ServiceState::Stopped));
    }

    #[test]
    fn notification_iff_observation_differs_from_previous() {
        let sequence = [
            false, false, true, true, true, false, true, false, false, true, true, false,
        ];
        let tracker = StateTracker::new();
        let mut previous: Option<bool> = None;

        for is_running in sequence {
            let notification = tracker.update(&obs(is_running));
            match previous {
                None => assert_eq!(notification, None),
                Some(prev) if prev == is_running => assert_eq!(notification, None),
                Some(_) => assert_eq!(
                    notification,
                    Some(Notification::entering(ServiceState::from_running(
                        is_running
                    )))
                ),
            }
            previous = Some(is_running);
            assert_eq!(
                tracker.current(),
                Some(ServiceState::from_running(is_running))
            );
        }
    }

    #[test]
    fn watch_receiver_sees_committed_state() {
        let tracker = StateTracker::new();
        let mut rx = tracker.watch();
        assert!(!rx.has_changed().unwrap());

        tracker.update(&obs(false));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(ServiceState::Stopped));

        // Unchanged observation does not wake watchers
        tracker.update(&obs(false));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_emit_one_notification_per_flip() {
        let tracker = Arc::new(StateTracker::new());
        tracker.update(&obs(false));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let tracker = Arc::clone(&tracker);
            handles.push(tokio::spawn(
                async move { tracker.update(&obs(true)).is_some() },
            ));
        }

        let mut emitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                emitted += 1;
            }
        }

        assert_eq!(emitted, 1);
        assert_eq!(tracker.current(), Some(ServiceState::Running));
    }
}
