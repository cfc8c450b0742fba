//! Relay error taxonomy and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors surfaced by the relay endpoint.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `action` or `keyHash` missing from the request body.
    #[error("Missing action or authentication")]
    MissingEnvelope,

    /// The key hash does not match an active admin key.
    #[error("Unauthorized: Invalid or inactive admin key")]
    Unauthorized,

    /// The admin's scope does not cover the target.
    #[error("Permission denied for this {0}")]
    PermissionDenied(&'static str),

    /// Unrecognized action tag.
    #[error("Invalid action")]
    InvalidAction(String),

    /// Recognized action with a malformed payload.
    #[error("Invalid payload: {0}")]
    Validation(String),

    /// The data store failed; the message is passed through.
    #[error("{0}")]
    Internal(String),

    /// The data store rejected a duplicate row (e.g. an email already
    /// banned). Reported to the client as an internal error.
    #[error("{0}")]
    Conflict(String),
}

impl From<RepositoryError> for RelayError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => Self::Conflict(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl RelayError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingEnvelope | Self::InvalidAction(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) | Self::Conflict(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(message) => {
                let event_id = sentry::capture_error(&self);
                tracing::error!(
                    error = %message,
                    sentry_event_id = %event_id,
                    "Relay data store error"
                );
            }
            Self::Conflict(message) => {
                tracing::warn!(error = %message, "Relay write rejected as duplicate");
            }
            _ => {}
        }

        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
