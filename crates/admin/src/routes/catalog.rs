//! Department and subject catalog.

use axum::{Json, Router, routing::get};
use serde::Serialize;

use studyspace_core::Department;

use crate::middleware::RequireAdminSession;
use crate::state::AppState;

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/catalog", get(catalog))
}

#[derive(Debug, Serialize)]
pub struct DepartmentEntry {
    pub code: Department,
    pub label: &'static str,
    pub subjects: &'static [&'static str],
}

#[must_use]
pub fn entries() -> Vec<DepartmentEntry> {
    Department::ALL
        .into_iter()
        .map(|department| DepartmentEntry {
            code: department,
            label: department.label(),
            subjects: department.subjects(),
        })
        .collect()
}

/// GET /api/catalog
async fn catalog(RequireAdminSession(_admin): RequireAdminSession) -> Json<Vec<DepartmentEntry>> {
    Json(entries())
}
