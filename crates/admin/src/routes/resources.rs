//! Resource moderation read endpoints.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use studyspace_core::ResourceStatus;

use crate::db::ResourceRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminSession;
use crate::models::{Resource, ResourceFilter, ResourceStats};
use crate::state::AppState;

use super::{ListResponse, filter_value};

/// Build the resources router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/resources", get(list_resources))
        .route("/api/resources/subjects", get(list_subjects))
}

#[derive(Debug, Default, Deserialize)]
pub struct ResourceQuery {
    pub semester: Option<String>,
    pub branch: Option<String>,
    pub subject: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, serde::Serialize)]
pub struct ResourceExtra {
    pub stats: ResourceStats,
}

/// Apply the free-text `search` to `resources` for display.
///
/// Stats cover every loaded resource, before the search narrows them.
#[must_use]
pub fn present(resources: Vec<Resource>, search: Option<&str>) -> (Vec<Resource>, ResourceStats) {
    let stats = ResourceStats::tally(&resources);

    let needle = search.map(str::trim).unwrap_or_default().to_lowercase();
    if needle.is_empty() {
        return (resources, stats);
    }
    let items = resources
        .into_iter()
        .filter(|r| r.matches_search(&needle))
        .collect();

    (items, stats)
}

/// GET /api/resources
async fn list_resources(
    RequireAdminSession(admin): RequireAdminSession,
    State(state): State<AppState>,
    Query(query): Query<ResourceQuery>,
) -> Result<Json<ListResponse<Resource, ResourceExtra>>, AppError> {
    let status = filter_value(query.status)
        .map(|s| s.parse::<ResourceStatus>())
        .transpose()
        .map_err(AppError::BadRequest)?;

    let filter = ResourceFilter {
        semester: filter_value(query.semester),
        branch: filter_value(query.branch),
        subject: filter_value(query.subject),
        status,
        college_id: admin.identity.college_scope().map(str::to_owned),
    };

    let response = match ResourceRepository::new(state.pool()).list(&filter).await {
        Ok(resources) => {
            let (items, stats) = present(resources, query.search.as_deref());
            ListResponse::loaded(items, ResourceExtra { stats })
        }
        Err(e) => ListResponse::degraded("resources", &e),
    };

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct SubjectsQuery {
    pub branch: String,
}

/// GET /api/resources/subjects
async fn list_subjects(
    RequireAdminSession(admin): RequireAdminSession,
    State(state): State<AppState>,
    Query(query): Query<SubjectsQuery>,
) -> Json<ListResponse<String>> {
    let response = match ResourceRepository::new(state.pool())
        .distinct_subjects(&query.branch, admin.identity.college_scope())
        .await
    {
        Ok(subjects) => ListResponse::loaded(subjects, ()),
        Err(e) => ListResponse::degraded("subjects", &e),
    };

    Json(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use studyspace_core::{ResourceId, ResourceType};

    use super::*;

    fn resource(title: &str, subject: &str, status: ResourceStatus) -> Resource {
        Resource {
            id: ResourceId::random(),
            title: title.to_owned(),
            description: None,
            semester: "4".to_owned(),
            branch: "cse".to_owned(),
            subject: subject.to_owned(),
            chapter: None,
            topic: None,
            resource_type: ResourceType::Pyq,
            status,
            source: "student".to_owned(),
            file_url: Some("https://files.example.net/q.pdf".to_owned()),
            video_url: None,
            college_id: Some("gec-thrissur".to_owned()),
            uploaded_by_name: Some("Arjun K".to_owned()),
            uploaded_by_email: Some("arjun@college.edu".to_owned()),
            created_at: Utc::now(),
        }
    }

    fn sample() -> Vec<Resource> {
        vec![
            resource("DBMS 2023 paper", "DBMS", ResourceStatus::Pending),
            resource("Normalization notes", "DBMS", ResourceStatus::Approved),
            resource("Scheduling paper", "Operating Systems", ResourceStatus::Rejected),
            resource("Paging summary", "Operating Systems", ResourceStatus::Pending),
        ]
    }

    #[test]
    fn test_search_narrows_items_but_not_stats() {
        let (items, stats) = present(sample(), Some("  OPERATING "));

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|r| r.subject == "Operating Systems"));
        assert_eq!(
            stats,
            ResourceStats {
                pending: 2,
                approved: 1,
                rejected: 1,
                total: 4,
            }
        );
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        for search in [None, Some(""), Some("   ")] {
            let (items, stats) = present(sample(), search);
            assert_eq!(items.len(), 4);
            assert_eq!(stats.total, 4);
        }

        let (items, stats) = present(sample(), Some("thermodynamics"));
        assert!(items.is_empty());
        assert_eq!(stats.total, 4);
    }
}
