//! Domain types for the service-control bridge.
//!
//! These are pure value types: no I/O, no locking. The only mutable state in
//! the system lives in [`crate::tracker::StateTracker`].

mod control;
mod event;
mod state;

pub use control::{ControlRequest, ControlResponse};
pub use event::{BridgeEvent, Notification};
pub use state::{LivenessObservation, ServiceState};
