//! Configuration interface errors.

use thiserror::Error;

use super::params::ParamKind;

/// Errors from parameter get/set/reset/constraint operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigureError {
    /// No parameter is mapped at this path.
    #[error("Unknown parameter path: {0}")]
    UnknownParameter(String),

    /// The parameter is fixed by the init script and cannot be changed.
    #[error("Parameter is read-only: {0}")]
    ReadOnly(String),

    /// The supplied value has the wrong type.
    #[error("Parameter {path} expects a {expected} value")]
    TypeMismatch { path: String, expected: ParamKind },

    /// The supplied value is out of range.
    #[error("Invalid value for {path}: {reason}")]
    InvalidValue { path: String, reason: String },

    /// Reading or writing the defaults file failed.
    #[error("Failed to access configuration: {0}")]
    Storage(String),
}
