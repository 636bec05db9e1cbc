//! Core domain types and port definitions for jack-bridge.
//!
//! This crate holds everything that does not touch the operating system:
//! the service state model, the transition tracker, the port traits that
//! runtime adapters implement, and the parameter table behind the
//! configuration interface.
#![deny(unused_crate_dependencies)]

pub mod configure;
pub mod domain;
pub mod ports;
pub mod settings;
pub mod tracker;

// Re-export commonly used types for convenience
pub use configure::{
    ConfigureError, Constraint, PARAMETERS, ParamKind, ParamSpec, ParamValue, ParameterValue,
    find_param, format_assignment, read_variable, upsert_variable,
};
pub use domain::{
    BridgeEvent, ControlRequest, ControlResponse, LivenessObservation, Notification, ServiceState,
};
pub use ports::{
    CommandError, LivenessProbe, NoopEmitter, NotificationEmitter, ServiceAction,
    ServiceCommandPort,
};
pub use settings::{
    BridgeSettings, DEFAULT_COMMAND_TIMEOUT, DEFAULT_DEFAULTS_FILE, DEFAULT_DEPENDENT_SETTLE,
    DEFAULT_DEPENDENT_STAGGER, DEFAULT_DEPENDENTS, DEFAULT_EVENT_CAPACITY, DEFAULT_PID_FILE,
    DEFAULT_POLL_INTERVAL, DEFAULT_PROBE_TIMEOUT, DEFAULT_SERVICE, DEFAULT_SERVICE_COMMAND,
    SettingsError, is_valid_service_name, validate_settings,
};
pub use tracker::StateTracker;

// Dev-dependencies only exercised by unit tests
#[cfg(test)]
use serde_json as _;
