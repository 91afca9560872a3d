//! Axum-specific error types and mappings.
//!
//! Maps relay failures to HTTP status codes and the JSON error
//! body the dashboard expects.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mc_relay::RelayError;
use serde::Serialize;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The request body was rejected before any upstream call.
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// The gateway could not be reached or failed before answering.
    #[error("Gateway error: {message}")]
    BadGateway {
        message: String,
        kind: &'static str,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    error_type: Option<&'static str>,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::MalformedRequest(_) => (StatusCode::BAD_REQUEST, Some("MALFORMED_REQUEST")),
            Self::BadGateway { kind, .. } => (StatusCode::BAD_GATEWAY, Some(*kind)),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = ErrorBody {
            error: self.to_string(),
            status: status.as_u16(),
            error_type,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<RelayError> for HttpError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MalformedRequest(msg) => Self::MalformedRequest(msg),
            e if e.is_upstream() => Self::BadGateway {
                kind: e.kind(),
                message: e.to_string(),
            },
            e => Self::Internal(e.to_string()),
        }
    }
}
