//! Pid-file based liveness probe.
//!
//! The managed service is started by its init script, which records the
//! daemon's pid in a file. A service counts as running when that file holds a
//! positive pid and a process with that pid exists.

use std::fs;
use std::path::PathBuf;

use jackbridge_core::ports::LivenessProbe;
use tracing::debug;

/// Liveness probe reading a pid file and checking the recorded process.
#[derive(Debug, Clone)]
pub struct PidFileProbe {
    path: PathBuf,
}

impl PidFileProbe {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Pid recorded in the file, if it is readable and well-formed.
    pub fn read_pid(&self) -> Option<u32> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Pid file not readable");
                return None;
            }
        };
        parse_pid(&content)
    }
}

impl LivenessProbe for PidFileProbe {
    fn probe(&self) -> bool {
        let Some(pid) = self.read_pid() else {
            return false;
        };
        let alive = pid_exists(pid);
        debug!(pid, alive, "Probed managed service");
        alive
    }
}

/// Parse the leading integer of a pid file.
///
/// Only the first whitespace-separated token is considered, and it must be
/// a whole integer: `1234abc` is rejected rather than read as 1234, unlike a
/// `%d` scan. Zero, negative and out-of-range values are rejected: signalling
/// them would address a process group rather than a single process.
fn parse_pid(content: &str) -> Option<u32> {
    let token = content.split_whitespace().next()?;
    let pid: i32 = token.parse().ok()?;
    u32::try_from(pid).ok().filter(|pid| *pid > 0)
}

/// Check if a PID exists.
///
/// Uses `kill` with the null signal, which checks existence without
/// delivering anything. `EPERM` counts as alive: the process exists but
/// belongs to another user. A bare `kill(pid, 0) == 0` test would report it
/// as not running.
#[cfg(unix)]
pub fn pid_exists(pid: u32) -> bool {
    use nix::sys::signal;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };

    match signal::kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(nix::errno::Errno::ESRCH) => false, // No such process
        Err(_) => true,                         // Process exists but we lack permission
    }
}

#[cfg(not(unix))]
pub fn pid_exists(_pid: u32) -> bool {
    false // Not implemented on non-Unix
}
