//! Liveness probe port.

/// Answers "is the externally managed service running right now?".
///
/// Implementations must be cheap, idempotent and side-effect free. A missing
/// or unreadable marker is a normal outcome and maps to `false`; it is never
/// reported as an error.
pub trait LivenessProbe: Send + Sync {
    /// Inspect process state once.
    fn probe(&self) -> bool;
}

impl<F> LivenessProbe for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn probe(&self) -> bool {
        self()
    }
}
