//! Fixed-period liveness polling.
//!
//! Every tick the monitor probes the managed service, feeds the observation
//! to the [`StateTracker`] and hands any confirmed transition to the
//! notification emitter. The loop is the tracker's only writer, so events
//! leave in the order the transitions were observed.

use std::sync::Arc;
use std::time::Duration;

use jackbridge_core::domain::{BridgeEvent, LivenessObservation, Notification};
use jackbridge_core::ports::{LivenessProbe, NotificationEmitter};
use jackbridge_core::tracker::StateTracker;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Run one probe off the async workers, bounded by `limit`.
///
/// A probe that panics or overruns counts as "not running". An overrunning
/// probe keeps its blocking thread until it returns on its own.
pub async fn bounded_probe(probe: Arc<dyn LivenessProbe>, limit: Duration) -> bool {
    match timeout(limit, tokio::task::spawn_blocking(move || probe.probe())).await {
        Ok(Ok(is_running)) => is_running,
        Ok(Err(e)) => {
            warn!(error = %e, "Liveness probe failed");
            false
        }
        Err(_) => {
            warn!(
                timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                "Liveness probe timed out"
            );
            false
        }
    }
}

/// Poll loop driving the tracker.
pub struct LivenessMonitor {
    probe: Arc<dyn LivenessProbe>,
    tracker: Arc<StateTracker>,
    emitter: Arc<dyn NotificationEmitter>,
    poll_interval: Duration,
    probe_timeout: Duration,
}

impl LivenessMonitor {
    /// Create a new monitor.
    ///
    /// # Arguments
    ///
    /// * `probe` - Liveness check run every tick
    /// * `tracker` - Holder of the service state belief
    /// * `emitter` - Receives confirmed transitions
    /// * `poll_interval` - Tick period
    /// * `probe_timeout` - Upper bound for a single probe
    pub fn new(
        probe: Arc<dyn LivenessProbe>,
        tracker: Arc<StateTracker>,
        emitter: Arc<dyn NotificationEmitter>,
        poll_interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            probe,
            tracker,
            emitter,
            poll_interval,
            probe_timeout,
        }
    }

    /// Probe once and timestamp the result.
    pub async fn observe(&self) -> LivenessObservation {
        let is_running = bounded_probe(Arc::clone(&self.probe), self.probe_timeout).await;
        LivenessObservation::now(is_running)
    }

    /// One poll cycle: probe, update the tracker, emit on transition.
    pub async fn poll_once(&self) -> Option<Notification> {
        let observation = self.observe().await;
        let notification = self.tracker.update(&observation)?;

        info!(
            notification = ?notification,
            state = %notification.resulting_state(),
            "Managed service changed state"
        );
        self.emitter
            .emit(BridgeEvent::new(notification, observation.observed_at));
        Some(notification)
    }

    /// Run the poll loop until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(
            interval_ms = u64::try_from(self.poll_interval.as_millis()).unwrap_or(u64::MAX),
            "Starting liveness monitor"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    debug!("Liveness monitor cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    // A cancellation during the probe still lets this cycle finish
                    self.poll_once().await;
                }
            }
        }
    }

    /// Spawn [`Self::run`] on the current runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcaster::NotificationBroadcaster;
    use jackbridge_core::domain::ServiceState;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn flag_probe(flag: &Arc<AtomicBool>) -> Arc<dyn LivenessProbe> {
        let flag = Arc::clone(flag);
        Arc::new(move || flag.load(Ordering::SeqCst))
    }

    fn monitor(
        probe: Arc<dyn LivenessProbe>,
        broadcaster: &NotificationBroadcaster,
    ) -> (LivenessMonitor, Arc<StateTracker>) {
        let tracker = Arc::new(StateTracker::new());
        let monitor = LivenessMonitor::new(
            probe,
            Arc::clone(&tracker),
            Arc::new(broadcaster.clone()),
            Duration::from_millis(50),
            Duration::from_millis(40),
        );
        (monitor, tracker)
    }

    #[tokio::test]
    async fn poll_once_seeds_then_reports_flips() {
        let flag = Arc::new(AtomicBool::new(false));
        let broadcaster = NotificationBroadcaster::new(8);
        let mut sub = broadcaster.subscribe();
        let (monitor, tracker) = monitor(flag_probe(&flag), &broadcaster);

        assert_eq!(monitor.poll_once().await, None);
        assert_eq!(tracker.current(), Some(ServiceState::Stopped));

        flag.store(true, Ordering::SeqCst);
        assert_eq!(monitor.poll_once().await, Some(Notification::Started));
        assert_eq!(monitor.poll_once().await, None);

        flag.store(false, Ordering::SeqCst);
        assert_eq!(monitor.poll_once().await, Some(Notification::Stopped));

        assert_eq!(sub.recv().await.unwrap().kind, Notification::Started);
        assert_eq!(sub.recv().await.unwrap().kind, Notification::Stopped);
    }

    #[tokio::test]
    async fn hanging_probe_counts_as_stopped() {
        let probe: Arc<dyn LivenessProbe> = Arc::new(|| {
            std::thread::sleep(Duration::from_millis(200));
            true
        });
        assert!(!bounded_probe(probe, Duration::from_millis(20)).await);
    }

    #[tokio::test]
    async fn panicking_probe_counts_as_stopped() {
        let probe: Arc<dyn LivenessProbe> = Arc::new(|| -> bool { panic!("probe exploded") });
        assert!(!bounded_probe(probe, Duration::from_millis(200)).await);
    }

    #[tokio::test]
    async fn run_loop_emits_transitions_until_cancelled() {
        let flag = Arc::new(AtomicBool::new(false));
        let broadcaster = NotificationBroadcaster::new(8);
        let mut sub = broadcaster.subscribe();
        let (monitor, tracker) = monitor(flag_probe(&flag), &broadcaster);

        let cancel = CancellationToken::new();
        let handle = monitor.spawn(cancel.clone());

        let mut rx = tracker.watch();
        rx.wait_for(Option::is_some).await.unwrap();

        flag.store(true, Ordering::SeqCst);
        let event = tokio::time::timeout(Duration::from_secs(2), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.kind, Notification::Started);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        // No further cycles after cancellation
        flag.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(tracker.current(), Some(ServiceState::Running));
    }
}
