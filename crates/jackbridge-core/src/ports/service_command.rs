//! Service command port.
//!
//! Issues start/stop actions for one pre-configured service. Implementations
//! report only whether the command itself ran successfully; whether the
//! service actually came up or went down is left to the next poll.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Action passed to the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    /// Verb understood by SysV `service` and compatible managers.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure to dispatch a service command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command could not be spawned (binary missing, permission denied).
    #[error("Failed to launch `{command}`: {reason}")]
    Launch { command: String, reason: String },

    /// The command ran but reported failure.
    #[error("`{command}` exited with {status}")]
    NonZeroExit { command: String, status: String },

    /// The command did not finish in time and was killed.
    #[error("`{command}` did not finish within {timeout_secs}s")]
    TimedOut { command: String, timeout_secs: u64 },
}

impl CommandError {
    /// The command line that failed.
    #[must_use]
    pub fn command(&self) -> &str {
        match self {
            Self::Launch { command, .. }
            | Self::NonZeroExit { command, .. }
            | Self::TimedOut { command, .. } => command,
        }
    }
}

/// Port for dispatching actions against a fixed, named service.
///
/// The service name is bound at construction; callers never supply text that
/// ends up on the command line.
#[async_trait]
pub trait ServiceCommandPort: Send + Sync {
    /// Name of the service this port controls (for logging).
    fn service(&self) -> &str;

    /// Run `action` and wait for the command (not the service) to finish.
    async fn dispatch(&self, action: ServiceAction) -> Result<(), CommandError>;

    async fn start(&self) -> Result<(), CommandError> {
        self.dispatch(ServiceAction::Start).await
    }

    async fn stop(&self) -> Result<(), CommandError> {
        self.dispatch(ServiceAction::Stop).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recording {
        actions: Mutex<Vec<ServiceAction>>,
    }

    #[async_trait]
    impl ServiceCommandPort for Recording {
        fn service(&self) -> &str {
            "jackd-rt"
        }

        async fn dispatch(&self, action: ServiceAction) -> Result<(), CommandError> {
            self.actions.lock().unwrap().push(action);
            if action == ServiceAction::Stop {
                return Err(CommandError::NonZeroExit {
                    command: format!("service jackd-rt {action}"),
                    status: "exit status: 1".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn start_and_stop_route_through_dispatch() {
        let port = Recording {
            actions: Mutex::new(Vec::new()),
        };

        assert!(port.start().await.is_ok());
        let err = port.stop().await.unwrap_err();
        assert_eq!(err.command(), "service jackd-rt stop");
        assert_eq!(
            *port.actions.lock().unwrap(),
            vec![ServiceAction::Start, ServiceAction::Stop]
        );
    }

    #[test]
    fn error_messages_name_the_command() {
        let err = CommandError::Launch {
            command: "service jackd-rt start".to_string(),
            reason: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to launch `service jackd-rt start`: No such file or directory"
        );
    }
}
