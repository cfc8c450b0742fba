//! Authentication extractors for admin.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use tower_sessions::Session;

use crate::error::set_sentry_admin;
use crate::models::AdminSession;
use crate::services::auth::AdminSessionStore;

/// Extractor that requires a live admin session.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminSession(admin): RequireAdminSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.identity.admin_name)
/// }
/// ```
pub struct RequireAdminSession(pub AdminSession);

/// Rejection when no valid admin session is present.
#[derive(Debug)]
pub enum SessionRejection {
    /// No session, or the session expired.
    Unauthorized,
    /// The session backend failed.
    Unavailable,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Not logged in or session expired" })),
            )
                .into_response(),
            Self::Unavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminSession
where
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(SessionRejection::Unauthorized)?;

        let admin = AdminSessionStore::new(session)
            .current(Utc::now())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to read admin session");
                SessionRejection::Unavailable
            })?
            .ok_or(SessionRejection::Unauthorized)?;

        set_sentry_admin(&admin.identity.admin_name);
        Ok(Self(admin))
    }
}
