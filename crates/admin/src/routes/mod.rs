//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth
//! POST /api/auth/login          - Log in with an admin secret key
//! POST /api/auth/logout         - Log out
//! GET  /api/auth/session        - Current session and permitted scope
//!
//! # Relay (re-authenticates keyHash on every call, no session needed)
//! POST /admin                   - Privileged mutation
//! POST /api/admin               - Same, at the path the dashboard calls
//!
//! # Reads (session required)
//! GET  /api/resources           - Resources with stats
//! GET  /api/resources/subjects  - Distinct subjects for a branch
//! GET  /api/notices             - Notices with counts
//! GET  /api/syllabus            - Syllabus documents
//! GET  /api/banned-users        - Banned users
//! GET  /api/catalog             - Departments and subjects
//!
//! # Uploads (session required)
//! POST /api/uploads             - Upload a file to the file host
//! ```

pub mod auth;
pub mod catalog;
pub mod notices;
pub mod relay;
pub mod resources;
pub mod syllabus;
pub mod uploads;
pub mod users;

use axum::Router;
use serde::Serialize;

use crate::state::AppState;

/// Build the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(relay::router())
        .merge(resources::router())
        .merge(notices::router())
        .merge(syllabus::router())
        .merge(users::router())
        .merge(catalog::router())
        .merge(uploads::router())
}

/// A read response. When the data store fails the list is empty and
/// `notice` says why; reads never fail the request.
#[derive(Debug, Serialize)]
pub struct ListResponse<T, X = ()> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub extra: X,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl<T, X> ListResponse<T, X> {
    #[must_use]
    pub const fn loaded(items: Vec<T>, extra: X) -> Self {
        Self {
            items,
            extra,
            notice: None,
        }
    }
}

impl<T, X: Default> ListResponse<T, X> {
    /// Empty response after a failed read of `what`.
    #[must_use]
    pub fn degraded(what: &str, error: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %error, "Failed to load {what}");
        Self {
            items: Vec::new(),
            extra: X::default(),
            notice: Some(format!("Failed to load {what}. Please refresh.")),
        }
    }
}

/// Treat an absent, empty or `all` filter value as unfiltered.
pub(crate) fn filter_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty() && v != "all")
}
