//! Control interface over the managed service.
//!
//! Start and stop only dispatch the service command; the resulting state
//! change is confirmed, and broadcast, by the poll loop. The controller never
//! writes the tracker.

use std::sync::Arc;
use std::time::Duration;

use jackbridge_core::domain::{ControlRequest, ControlResponse, ServiceState};
use jackbridge_core::ports::{CommandError, LivenessProbe, ServiceAction, ServiceCommandPort};
use jackbridge_core::tracker::StateTracker;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::broadcaster::{NotificationBroadcaster, Subscription};
use crate::monitor::bounded_probe;

/// Pacing of dependent service restarts after a start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependentTiming {
    /// Wait after the managed service started before the first restart.
    pub settle: Duration,
    /// Wait between consecutive restarts.
    pub stagger: Duration,
}

/// Handles control requests for one managed service.
pub struct BridgeController {
    tracker: Arc<StateTracker>,
    probe: Arc<dyn LivenessProbe>,
    probe_timeout: Duration,
    service: Arc<dyn ServiceCommandPort>,
    dependents: Arc<[Arc<dyn ServiceCommandPort>]>,
    timing: DependentTiming,
    broadcaster: NotificationBroadcaster,
    // Serializes start/stop dispatches
    dispatch_lock: Mutex<()>,
}

impl BridgeController {
    pub fn new(
        tracker: Arc<StateTracker>,
        probe: Arc<dyn LivenessProbe>,
        probe_timeout: Duration,
        service: Arc<dyn ServiceCommandPort>,
        broadcaster: NotificationBroadcaster,
    ) -> Self {
        Self {
            tracker,
            probe,
            probe_timeout,
            service,
            dependents: Vec::new().into(),
            timing: DependentTiming {
                settle: Duration::ZERO,
                stagger: Duration::ZERO,
            },
            broadcaster,
            dispatch_lock: Mutex::new(()),
        }
    }

    /// Services restarted after a start and stopped, in reverse, after a stop.
    #[must_use]
    pub fn with_dependents(
        mut self,
        dependents: Vec<Arc<dyn ServiceCommandPort>>,
        timing: DependentTiming,
    ) -> Self {
        self.dependents = dependents.into();
        self.timing = timing;
        self
    }

    /// Dispatch a request.
    pub async fn handle(&self, request: ControlRequest) -> Result<ControlResponse, CommandError> {
        debug!(?request, "Handling control request");
        match request {
            ControlRequest::Start => self.start().await,
            ControlRequest::Stop => self.stop().await,
            ControlRequest::Query => Ok(ControlResponse::State {
                state: self.state(),
            }),
            ControlRequest::NoOp => Ok(ControlResponse::Acknowledged),
        }
    }

    /// Tracker's current belief.
    pub fn state(&self) -> Option<ServiceState> {
        self.tracker.current()
    }

    /// Whether the tracker believes the service is running.
    pub fn is_running(&self) -> bool {
        self.state().is_some_and(ServiceState::is_running)
    }

    /// Register a notification subscriber.
    pub fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    /// Issue the start command unless the service is already live.
    pub async fn start(&self) -> Result<ControlResponse, CommandError> {
        let _guard = self.dispatch_lock.lock().await;

        if self.probe_now().await {
            info!(service = self.service.service(), "Start requested but service is already running");
            return Ok(ControlResponse::AlreadyRunning);
        }

        info!(service = self.service.service(), "Starting managed service");
        self.service.start().await?;
        self.restart_dependents();
        Ok(ControlResponse::Dispatched)
    }

    /// Issue the stop command unless the service is already dead.
    pub async fn stop(&self) -> Result<ControlResponse, CommandError> {
        let _guard = self.dispatch_lock.lock().await;

        if !self.probe_now().await {
            info!(service = self.service.service(), "Stop requested but service is not running");
            return Ok(ControlResponse::AlreadyStopped);
        }

        info!(service = self.service.service(), "Stopping managed service");
        self.service.stop().await?;
        self.stop_dependents();
        Ok(ControlResponse::Dispatched)
    }

    async fn probe_now(&self) -> bool {
        bounded_probe(Arc::clone(&self.probe), self.probe_timeout).await
    }

    fn restart_dependents(&self) {
        if self.dependents.is_empty() {
            return;
        }
        let dependents = Arc::clone(&self.dependents);
        let timing = self.timing;

        tokio::spawn(async move {
            sleep(timing.settle).await;
            for (i, dependent) in dependents.iter().enumerate() {
                if i > 0 {
                    sleep(timing.stagger).await;
                }
                run_dependent(dependent.as_ref(), ServiceAction::Restart).await;
            }
        });
    }

    fn stop_dependents(&self) {
        if self.dependents.is_empty() {
            return;
        }
        let dependents = Arc::clone(&self.dependents);

        tokio::spawn(async move {
            for dependent in dependents.iter().rev() {
                run_dependent(dependent.as_ref(), ServiceAction::Stop).await;
            }
        });
    }
}

async fn run_dependent(dependent: &dyn ServiceCommandPort, action: ServiceAction) {
    match dependent.dispatch(action).await {
        Ok(()) => info!(service = dependent.service(), %action, "Dependent service updated"),
        Err(e) => warn!(service = dependent.service(), %action, error = %e, "Dependent service command failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use jackbridge_core::domain::LivenessObservation;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    type Log = Arc<StdMutex<Vec<String>>>;

    struct FakeService {
        name: &'static str,
        fail: bool,
        log: Log,
    }

    #[async_trait]
    impl ServiceCommandPort for FakeService {
        fn service(&self) -> &str {
            self.name
        }

        async fn dispatch(&self, action: ServiceAction) -> Result<(), CommandError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{} {action}", self.name));
            if self.fail {
                return Err(CommandError::NonZeroExit {
                    command: format!("service {} {action}", self.name),
                    status: "exit status: 1".to_string(),
                });
            }
            Ok(())
        }
    }

    struct Harness {
        controller: BridgeController,
        live: Arc<AtomicBool>,
        tracker: Arc<StateTracker>,
        log: Log,
    }

    fn harness(fail: bool) -> Harness {
        let live = Arc::new(AtomicBool::new(false));
        let tracker = Arc::new(StateTracker::new());
        let log: Log = Arc::default();
        let probe = {
            let live = Arc::clone(&live);
            Arc::new(move || live.load(Ordering::SeqCst))
        };
        let service = Arc::new(FakeService {
            name: "jackd-rt",
            fail,
            log: Arc::clone(&log),
        });
        let dependents: Vec<Arc<dyn ServiceCommandPort>> = vec![
            Arc::new(FakeService {
                name: "jack-bridge-ports",
                fail: false,
                log: Arc::clone(&log),
            }),
            Arc::new(FakeService {
                name: "jack-connection-manager",
                fail: true,
                log: Arc::clone(&log),
            }),
        ];
        let controller = BridgeController::new(
            Arc::clone(&tracker),
            probe,
            Duration::from_millis(200),
            service,
            NotificationBroadcaster::new(4),
        )
        .with_dependents(
            dependents,
            DependentTiming {
                settle: Duration::from_millis(10),
                stagger: Duration::from_millis(5),
            },
        );
        Harness {
            controller,
            live,
            tracker,
            log,
        }
    }

    async fn wait_for_log(log: &Log, len: usize) -> Vec<String> {
        for _ in 0..100 {
            if log.lock().unwrap().len() >= len {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn start_dispatches_then_restarts_dependents_in_order() {
        let h = harness(false);
        let response = h.controller.handle(ControlRequest::Start).await.unwrap();
        assert_eq!(response, ControlResponse::Dispatched);

        let log = wait_for_log(&h.log, 3).await;
        assert_eq!(
            log,
            vec![
                "jackd-rt start",
                "jack-bridge-ports restart",
                "jack-connection-manager restart",
            ]
        );
        // Tracker is left to the poll loop
        assert_eq!(h.tracker.current(), None);
    }

    #[tokio::test]
    async fn start_when_live_is_acknowledged_without_command() {
        let h = harness(false);
        h.live.store(true, Ordering::SeqCst);
        let response = h.controller.start().await.unwrap();
        assert_eq!(response, ControlResponse::AlreadyRunning);
        sleep(Duration::from_millis(50)).await;
        assert!(h.log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stop_dispatches_then_stops_dependents_in_reverse() {
        let h = harness(false);
        h.live.store(true, Ordering::SeqCst);
        let response = h.controller.stop().await.unwrap();
        assert_eq!(response, ControlResponse::Dispatched);

        let log = wait_for_log(&h.log, 3).await;
        assert_eq!(
            log,
            vec![
                "jackd-rt stop",
                "jack-connection-manager stop",
                "jack-bridge-ports stop",
            ]
        );
    }

    #[tokio::test]
    async fn stop_when_dead_is_acknowledged_without_command() {
        let h = harness(false);
        let response = h.controller.stop().await.unwrap();
        assert_eq!(response, ControlResponse::AlreadyStopped);
        assert!(h.log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn command_failure_is_reported_and_skips_dependents() {
        let h = harness(true);
        let err = h.controller.start().await.unwrap_err();
        assert_eq!(err.command(), "service jackd-rt start");

        sleep(Duration::from_millis(50)).await;
        assert_eq!(*h.log.lock().unwrap(), vec!["jackd-rt start"]);
        assert_eq!(h.tracker.current(), None);
    }

    #[tokio::test]
    async fn query_and_noop_do_not_touch_the_service() {
        let h = harness(false);
        assert_eq!(
            h.controller.handle(ControlRequest::Query).await.unwrap(),
            ControlResponse::State { state: None }
        );

        h.tracker.update(&LivenessObservation::now(true));
        assert!(h.controller.is_running());
        assert_eq!(
            h.controller.handle(ControlRequest::Query).await.unwrap(),
            ControlResponse::State {
                state: Some(ServiceState::Running)
            }
        );

        assert_eq!(
            h.controller.handle(ControlRequest::NoOp).await.unwrap(),
            ControlResponse::Acknowledged
        );
        assert!(h.log.lock().unwrap().is_empty());
    }

    struct SlowService;

    #[async_trait]
    impl ServiceCommandPort for SlowService {
        fn service(&self) -> &str {
            "jackd-rt"
        }

        async fn dispatch(&self, _action: ServiceAction) -> Result<(), CommandError> {
            sleep(Duration::from_secs(2)).await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn query_answers_while_start_command_runs() {
        let tracker = Arc::new(StateTracker::new());
        tracker.update(&LivenessObservation::now(false));
        let controller = Arc::new(BridgeController::new(
            Arc::clone(&tracker),
            Arc::new(|| false),
            Duration::from_millis(200),
            Arc::new(SlowService),
            NotificationBroadcaster::new(4),
        ));

        let start = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.start().await })
        };
        // Let the start request take the dispatch lock
        sleep(Duration::from_millis(100)).await;

        let began = tokio::time::Instant::now();
        let response = tokio::time::timeout(
            Duration::from_millis(500),
            controller.handle(ControlRequest::Query),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(began.elapsed() < Duration::from_millis(500));
        assert_eq!(
            response,
            ControlResponse::State {
                state: Some(ServiceState::Stopped)
            }
        );
        assert!(!controller.is_running());
        assert!(!start.is_finished());

        assert_eq!(start.await.unwrap().unwrap(), ControlResponse::Dispatched);
    }
}
