//! Syllabus read endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use studyspace_core::Department;

use crate::db::SyllabusRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminSession;
use crate::models::{Syllabus, SyllabusFilter};
use crate::state::AppState;

use super::{ListResponse, filter_value};

/// Build the syllabus router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/syllabus", get(list_syllabus))
}

#[derive(Debug, Default, Deserialize)]
pub struct SyllabusQuery {
    pub branch: Option<String>,
    pub semester: Option<String>,
}

/// GET /api/syllabus
async fn list_syllabus(
    RequireAdminSession(_admin): RequireAdminSession,
    State(state): State<AppState>,
    Query(query): Query<SyllabusQuery>,
) -> Result<Json<ListResponse<Syllabus>>, AppError> {
    let branch = filter_value(query.branch)
        .map(|b| b.parse::<Department>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let filter = SyllabusFilter {
        branch,
        semester: filter_value(query.semester),
    };

    let response = match SyllabusRepository::new(state.pool()).list(&filter).await {
        Ok(items) => ListResponse::loaded(items, ()),
        Err(e) => ListResponse::degraded("syllabus", &e),
    };

    Ok(Json(response))
}
