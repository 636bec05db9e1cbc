//! Axum-specific error types and mappings.
//!
//! Maps command and configuration errors to HTTP status codes and JSON
//! response bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jackbridge_core::{CommandError, ConfigureError};
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Bad request (invalid input).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Service unavailable (the service manager command failed).
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<CommandError> for HttpError {
    fn from(err: CommandError) -> Self {
        Self::ServiceUnavailable(err.to_string())
    }
}

impl From<ConfigureError> for HttpError {
    fn from(err: ConfigureError) -> Self {
        match err {
            ConfigureError::UnknownParameter(_)
            | ConfigureError::ReadOnly(_)
            | ConfigureError::TypeMismatch { .. }
            | ConfigureError::InvalidValue { .. } => Self::BadRequest(err.to_string()),
            ConfigureError::Storage(msg) => Self::Internal(format!("Storage: {msg}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jackbridge_core::ParamKind;

    #[test]
    fn command_errors_are_unavailable() {
        let err: HttpError = CommandError::TimedOut {
            command: "service jackd-rt start".to_string(),
            timeout_secs: 30,
        }
        .into();
        assert_eq!(
            err.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn configure_errors_map_by_kind() {
        let bad: HttpError = ConfigureError::TypeMismatch {
            path: "driver/rate".to_string(),
            expected: ParamKind::Uint,
        }
        .into();
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let storage: HttpError = ConfigureError::Storage("disk full".to_string()).into();
        assert_eq!(
            storage.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
