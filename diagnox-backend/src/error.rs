//! Error types for the diagnosis gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Errors surfaced by the gateway and the diagnosis coordinator.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed form fields.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Well-formed request carrying an unacceptable upload.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    /// A prediction endpoint failed. `reason` never echoes the upstream body.
    #[error("Prediction endpoint '{endpoint}' failed: {reason}")]
    Upstream { endpoint: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status and error type tag for each error kind.
    pub fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            Error::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            Error::Upstream { .. } => (StatusCode::BAD_GATEWAY, "upstream_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    pub(crate) fn upstream(endpoint: &str, reason: impl Into<String>) -> Self {
        Error::Upstream {
            endpoint: endpoint.to_string(),
            reason: reason.into(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string()
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
