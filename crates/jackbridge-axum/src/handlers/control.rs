//! Control handlers - start/stop/query of the managed service.

use axum::Json;
use axum::extract::State;
use jackbridge_core::domain::{ControlRequest, ControlResponse, ServiceState};
use serde::Serialize;

use crate::error::HttpError;
use crate::state::AppState;

/// Response for the running query.
#[derive(Debug, Serialize)]
pub struct StartedResponse {
    pub started: bool,
}

/// Snapshot of the bridge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// `running`, `stopped`, or `unknown` before the first poll.
    pub state: &'static str,
    pub subscribers: usize,
    pub poll_interval_ms: u64,
}

/// Whether the service is believed running.
pub async fn started(State(state): State<AppState>) -> Json<StartedResponse> {
    Json(StartedResponse {
        started: state.controller.is_running(),
    })
}

/// Issue the start command.
pub async fn start(State(state): State<AppState>) -> Result<Json<ControlResponse>, HttpError> {
    Ok(Json(state.controller.handle(ControlRequest::Start).await?))
}

/// Issue the stop command.
pub async fn stop(State(state): State<AppState>) -> Result<Json<ControlResponse>, HttpError> {
    Ok(Json(state.controller.handle(ControlRequest::Stop).await?))
}

/// Accepted for client compatibility; has no effect.
pub async fn switch_master(
    State(state): State<AppState>,
) -> Result<Json<ControlResponse>, HttpError> {
    Ok(Json(state.controller.handle(ControlRequest::NoOp).await?))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let label = match state.controller.state() {
        Some(ServiceState::Running) => "running",
        Some(ServiceState::Stopped) => "stopped",
        None => "unknown",
    };
    Json(StatusResponse {
        state: label,
        subscribers: state.controller.subscriber_count(),
        poll_interval_ms: u64::try_from(state.poll_interval.as_millis()).unwrap_or(u64::MAX),
    })
}
