//! Service manager command execution.
//!
//! Runs `<program> <service> <action>` without a shell. The program and the
//! service name are fixed at construction, so no caller-supplied text ever
//! reaches the command line.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use jackbridge_core::ports::{CommandError, ServiceAction, ServiceCommandPort};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Longest stderr excerpt carried into logs.
const STDERR_EXCERPT: usize = 512;

/// Dispatches start/stop/restart through a SysV-style service front-end.
#[derive(Debug, Clone)]
pub struct ServiceCommandExecutor {
    program: String,
    service: String,
    timeout: Duration,
}

impl ServiceCommandExecutor {
    pub fn new(program: impl Into<String>, service: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            service: service.into(),
            timeout,
        }
    }

    /// Executor for another service using the same front-end and timeout.
    #[must_use]
    pub fn for_service(&self, service: impl Into<String>) -> Self {
        Self {
            program: self.program.clone(),
            service: service.into(),
            timeout: self.timeout,
        }
    }

    fn command_line(&self, action: ServiceAction) -> String {
        format!("{} {} {}", self.program, self.service, action)
    }
}

#[async_trait]
impl ServiceCommandPort for ServiceCommandExecutor {
    fn service(&self) -> &str {
        &self.service
    }

    async fn dispatch(&self, action: ServiceAction) -> Result<(), CommandError> {
        let command = self.command_line(action);
        debug!(%command, "Running service command");

        let mut cmd = Command::new(&self.program);
        cmd.arg(&self.service)
            .arg(action.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child
        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                warn!(%command, error = %e, "Failed to launch service command");
                return Err(CommandError::Launch {
                    command,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!(%command, timeout_secs = self.timeout.as_secs(), "Service command timed out");
                return Err(CommandError::TimedOut {
                    command,
                    timeout_secs: self.timeout.as_secs(),
                });
            }
        };

        if output.status.success() {
            info!(%command, "Service command succeeded");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
        warn!(%command, status = %output.status, stderr = %excerpt, "Service command failed");
        Err(CommandError::NonZeroExit {
            command,
            status: output.status.to_string(),
        })
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;

    fn executor(program: &str) -> ServiceCommandExecutor {
        ServiceCommandExecutor::new(program, "jackd-rt", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn successful_command_dispatches() {
        assert!(executor("true").start().await.is_ok());
    }

    #[tokio::test]
    async fn failing_command_reports_exit_status() {
        let err = executor("false").stop().await.unwrap_err();
        assert!(matches!(err, CommandError::NonZeroExit { .. }));
        assert_eq!(err.command(), "false jackd-rt stop");
    }

    #[tokio::test]
    async fn missing_program_reports_launch_failure() {
        let err = executor("/nonexistent/service-front-end")
            .start()
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Launch { .. }));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        // `sh <script> start` hangs regardless of the action
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow-service");
        std::fs::write(&script, "sleep 5\n").unwrap();

        let executor =
            ServiceCommandExecutor::new("sh", script.to_string_lossy(), Duration::from_millis(200));
        let err = executor.start().await.unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
    }

    #[test]
    fn for_service_keeps_front_end() {
        let dependent = executor("service").for_service("jack-bridge-ports");
        assert_eq!(dependent.service(), "jack-bridge-ports");
        assert_eq!(
            dependent.command_line(ServiceAction::Restart),
            "service jack-bridge-ports restart"
        );
    }
}
