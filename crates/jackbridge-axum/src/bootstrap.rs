//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the Axum web adapter. All concrete implementations are instantiated here.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use jackbridge_core::ports::{LivenessProbe, NotificationEmitter, ServiceCommandPort};
use jackbridge_core::{BridgeSettings, StateTracker, validate_settings};
use jackbridge_runtime::{
    BridgeController, ConfigureService, DefaultsStore, DependentTiming, LivenessMonitor,
    NotificationBroadcaster, PidFileProbe, ServiceCommandExecutor,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default listen address (loopback only).
pub const DEFAULT_LISTEN: &str = "127.0.0.1:9877";

/// CORS configuration for the web server.
///
/// There is no default: the CLI maps an empty origin list to
/// `AllowOrigins(vec![])`, which permits no cross-origin access.
#[derive(Debug, Clone)]
pub enum CorsConfig {
    /// Allow all origins.
    AllowAll,
    /// Allow only the listed origins.
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub listen: SocketAddr,
    /// Bridge runtime settings.
    pub bridge: BridgeSettings,
    /// CORS configuration.
    pub cors: CorsConfig,
}

/// Application context for the Axum adapter.
///
/// This struct holds all initialized services for the web server.
pub struct AxumContext {
    /// Control interface over the managed service.
    pub controller: Arc<BridgeController>,
    /// Parameter configuration backed by the defaults file.
    pub configure: Arc<ConfigureService>,
    /// Poll period, reported by the status endpoint.
    pub poll_interval: Duration,
    /// Fired on shutdown; ends open event streams.
    pub shutdown: CancellationToken,
}

/// Bootstrap the bridge services.
///
/// Validates settings, wires the adapters and runs the initial probe so the
/// tracker is seeded before anything is served. The returned monitor is not
/// yet running.
pub async fn bootstrap(
    config: &ServerConfig,
    shutdown: CancellationToken,
) -> Result<(AxumContext, LivenessMonitor)> {
    let settings = &config.bridge;
    validate_settings(settings).context("Invalid bridge settings")?;

    info!(
        pid_file = %settings.pid_file.display(),
        service = %settings.service,
        service_command = %settings.service_command,
        dependents = ?settings.dependents,
        defaults_file = %settings.defaults_file.display(),
        poll_interval_ms = u64::try_from(settings.poll_interval.as_millis()).unwrap_or(u64::MAX),
        "Axum bootstrap resolved settings"
    );

    // 1. State and notification fan-out
    let tracker = Arc::new(StateTracker::new());
    let broadcaster = NotificationBroadcaster::new(settings.event_capacity);

    // 2. OS adapters
    let probe: Arc<dyn LivenessProbe> = Arc::new(PidFileProbe::new(&settings.pid_file));
    let executor = ServiceCommandExecutor::new(
        settings.service_command.clone(),
        settings.service.clone(),
        settings.command_timeout,
    );
    let dependents: Vec<Arc<dyn ServiceCommandPort>> = settings
        .dependents
        .iter()
        .map(|name| Arc::new(executor.for_service(name.clone())) as Arc<dyn ServiceCommandPort>)
        .collect();

    // 3. Poll loop, seeded before serving
    let emitter: Arc<dyn NotificationEmitter> = Arc::new(broadcaster.clone());
    let monitor = LivenessMonitor::new(
        Arc::clone(&probe),
        Arc::clone(&tracker),
        emitter,
        settings.poll_interval,
        settings.probe_timeout,
    );
    monitor.poll_once().await;

    // 4. Control and configuration services
    let controller = BridgeController::new(
        Arc::clone(&tracker),
        probe,
        settings.probe_timeout,
        Arc::new(executor),
        broadcaster,
    )
    .with_dependents(
        dependents,
        DependentTiming {
            settle: settings.dependent_settle,
            stagger: settings.dependent_stagger,
        },
    );
    let configure = ConfigureService::new(DefaultsStore::new(&settings.defaults_file), tracker);

    let ctx = AxumContext {
        controller: Arc::new(controller),
        configure: Arc::new(configure),
        poll_interval: settings.poll_interval,
        shutdown,
    };
    Ok((ctx, monitor))
}

/// Run the bridge until `shutdown` fires.
///
/// Seeds the tracker, starts the poll loop, binds the listener and serves
/// with graceful shutdown. The poll loop is awaited before returning.
pub async fn start_server(config: ServerConfig, shutdown: CancellationToken) -> Result<()> {
    let (ctx, monitor) = bootstrap(&config, shutdown.clone()).await?;
    info!(state = ?ctx.controller.state(), "Initial service state");

    let monitor_task = monitor.spawn(shutdown.clone());
    let app = crate::routes::create_router(ctx, &config.cors);

    let listener = match TcpListener::bind(config.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            shutdown.cancel();
            join_monitor(monitor_task).await;
            return Err(e).with_context(|| format!("Failed to bind {}", config.listen));
        }
    };
    if let Ok(addr) = listener.local_addr() {
        info!("jack-bridge listening on http://{addr}");
    }

    let signal = shutdown.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move { signal.cancelled().await })
        .await;

    shutdown.cancel();
    join_monitor(monitor_task).await;
    info!("jack-bridge stopped");

    served.context("HTTP server failed")
}

/// Wait for the poll loop to exit. Returns `false` if it panicked or was
/// aborted.
async fn join_monitor(task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Liveness monitor terminated abnormally");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn join_monitor_reports_panicked_loop() {
        assert!(join_monitor(tokio::spawn(async {})).await);

        let panicked: JoinHandle<()> = tokio::spawn(async { panic!("poll loop exploded") });
        assert!(!join_monitor(panicked).await);
    }
}
