//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No process or filesystem types in any signature
//! - Probing is synchronous and infallible; failures collapse to `false`
//! - Command dispatch never waits for the managed service to change state

pub mod liveness;
pub mod notification_emitter;
pub mod service_command;

pub use liveness::LivenessProbe;
pub use notification_emitter::{NoopEmitter, NotificationEmitter};
pub use service_command::{CommandError, ServiceAction, ServiceCommandPort};
