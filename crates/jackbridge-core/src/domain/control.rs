//! Control requests accepted by the bridge and their responses.

use serde::{Deserialize, Serialize};

use super::state::ServiceState;

/// A request against the control interface. Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControlRequest {
    /// Issue the start command for the managed service.
    Start,
    /// Issue the stop command for the managed service.
    Stop,
    /// Report the tracker's current belief.
    Query,
    /// Compatibility request (e.g. `SwitchMaster`): accepted, no effect.
    NoOp,
}

/// Outcome of a successfully handled [`ControlRequest`].
///
/// Command failures are reported as `Err(CommandError)` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ControlResponse {
    /// Current belief. `None` only before the first poll has completed.
    State { state: Option<ServiceState> },
    /// The external command ran and exited successfully. The state flip, if
    /// any, is confirmed by a later poll.
    Dispatched,
    /// The service was already live, so no start command was issued.
    AlreadyRunning,
    /// The service was already dead, so no stop command was issued.
    AlreadyStopped,
    /// Compatibility request acknowledged.
    Acknowledged,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_wire_format() {
        let json = serde_json::to_string(&ControlResponse::Dispatched).unwrap();
        assert_eq!(json, r#"{"outcome":"dispatched"}"#);

        let json = serde_json::to_string(&ControlResponse::AlreadyRunning).unwrap();
        assert_eq!(json, r#"{"outcome":"alreadyRunning"}"#);

        let json = serde_json::to_string(&ControlResponse::State {
            state: Some(ServiceState::Running),
        })
        .unwrap();
        assert_eq!(json, r#"{"outcome":"state","state":"running"}"#);
    }
}
