//! Bridge settings and validation.
//!
//! These are pure domain types with no infrastructure dependencies. Adapters
//! fill them from flags and environment, then call [`validate_settings`]
//! before anything is started.

use std::path::PathBuf;
use std::time::Duration;

/// Pid file written by the init script of the managed service.
pub const DEFAULT_PID_FILE: &str = "/var/run/jackd-rt.pid";

/// Name of the managed service.
pub const DEFAULT_SERVICE: &str = "jackd-rt";

/// Service manager front-end invoked as `<command> <service> <action>`.
pub const DEFAULT_SERVICE_COMMAND: &str = "service";

/// Services restarted after a start and stopped after a stop, in order.
pub const DEFAULT_DEPENDENTS: &[&str] = &["jack-bridge-ports", "jack-connection-manager"];

/// Shell defaults file read by the managed service's init script.
pub const DEFAULT_DEFAULTS_FILE: &str = "/etc/default/jackd-rt";

/// Fixed poll period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound on a single probe before it counts as "not running".
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// Upper bound on a single start/stop command.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-subscriber notification buffer.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Delay after a successful start before dependents are restarted.
pub const DEFAULT_DEPENDENT_SETTLE: Duration = Duration::from_millis(1500);

/// Delay between consecutive dependent restarts.
pub const DEFAULT_DEPENDENT_STAGGER: Duration = Duration::from_millis(500);

/// Runtime settings of the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeSettings {
    pub pid_file: PathBuf,
    pub service: String,
    pub service_command: String,
    pub dependents: Vec<String>,
    pub defaults_file: PathBuf,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
    pub command_timeout: Duration,
    pub event_capacity: usize,
    pub dependent_settle: Duration,
    pub dependent_stagger: Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            pid_file: PathBuf::from(DEFAULT_PID_FILE),
            service: DEFAULT_SERVICE.to_string(),
            service_command: DEFAULT_SERVICE_COMMAND.to_string(),
            dependents: DEFAULT_DEPENDENTS.iter().map(ToString::to_string).collect(),
            defaults_file: PathBuf::from(DEFAULT_DEFAULTS_FILE),
            poll_interval: DEFAULT_POLL_INTERVAL,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            dependent_settle: DEFAULT_DEPENDENT_SETTLE,
            dependent_stagger: DEFAULT_DEPENDENT_STAGGER,
        }
    }
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Service name cannot be empty")]
    EmptyServiceName,

    #[error("Invalid service name {0:?}: only letters, digits and . _ @ - are allowed")]
    InvalidServiceName(String),

    #[error("Service command cannot be empty")]
    EmptyServiceCommand,

    #[error("Pid file path cannot be empty")]
    EmptyPidFile,

    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("Probe timeout must be greater than zero and below the poll interval")]
    InvalidProbeTimeout,

    #[error("Command timeout must be greater than zero")]
    ZeroCommandTimeout,

    #[error("Event capacity must be between 1 and 4096, got {0}")]
    InvalidEventCapacity(usize),
}

/// Whether `name` is safe to pass to the service manager as a single argument.
#[must_use]
pub fn is_valid_service_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '-'))
}

/// Validate settings values.
pub fn validate_settings(settings: &BridgeSettings) -> Result<(), SettingsError> {
    if settings.service.is_empty() {
        return Err(SettingsError::EmptyServiceName);
    }

    for name in std::iter::once(&settings.service).chain(&settings.dependents) {
        if !is_valid_service_name(name) {
            return Err(SettingsError::InvalidServiceName(name.clone()));
        }
    }

    if settings.service_command.trim().is_empty() {
        return Err(SettingsError::EmptyServiceCommand);
    }

    if settings.pid_file.as_os_str().is_empty() {
        return Err(SettingsError::EmptyPidFile);
    }

    if settings.poll_interval.is_zero() {
        return Err(SettingsError::ZeroPollInterval);
    }

    if settings.probe_timeout.is_zero() || settings.probe_timeout >= settings.poll_interval {
        return Err(SettingsError::InvalidProbeTimeout);
    }

    if settings.command_timeout.is_zero() {
        return Err(SettingsError::ZeroCommandTimeout);
    }

    if !(1..=4096).contains(&settings.event_capacity) {
        return Err(SettingsError::InvalidEventCapacity(settings.event_capacity));
    }

    Ok(())
}
