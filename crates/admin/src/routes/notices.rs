//! Notice read endpoint.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use studyspace_core::Department;

use crate::db::NoticeRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminSession;
use crate::models::notice::visible_to;
use crate::models::{Notice, NoticeCounts, NoticeSort};
use crate::state::AppState;

use super::{ListResponse, filter_value};

/// Build the notices router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/notices", get(list_notices))
}

#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub department: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: NoticeSort,
}

/// A notice with its expiry evaluated at request time.
#[derive(Debug, Serialize)]
pub struct NoticeView {
    #[serde(flatten)]
    pub notice: Notice,
    #[serde(rename = "isExpired")]
    pub is_expired: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct NoticeExtra {
    pub counts: NoticeCounts,
}

/// Filter, search and sort `notices` for display.
///
/// Counts cover every notice, before any filtering.
#[must_use]
pub fn present(
    notices: Vec<Notice>,
    department: Option<Department>,
    search: Option<&str>,
    sort: NoticeSort,
    now: DateTime<Utc>,
) -> (Vec<NoticeView>, NoticeCounts) {
    let counts = NoticeCounts::tally(&notices);

    let needle = search.map(str::trim).unwrap_or_default().to_lowercase();
    let mut notices: Vec<Notice> = visible_to(notices, department)
        .into_iter()
        .filter(|n| needle.is_empty() || n.matches_search(&needle))
        .collect();
    sort.apply(&mut notices);

    let views = notices
        .into_iter()
        .map(|notice| NoticeView {
            is_expired: notice.is_expired(now),
            notice,
        })
        .collect();

    (views, counts)
}

/// GET /api/notices
async fn list_notices(
    RequireAdminSession(_admin): RequireAdminSession,
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Json<ListResponse<NoticeView, NoticeExtra>>, AppError> {
    let department = filter_value(query.department)
        .map(|d| d.parse::<Department>())
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let response = match NoticeRepository::new(state.pool()).list_all().await {
        Ok(notices) => {
            let (items, counts) = present(
                notices,
                department,
                query.search.as_deref(),
                query.sort,
                Utc::now(),
            );
            ListResponse::loaded(items, NoticeExtra { counts })
        }
        Err(e) => ListResponse::degraded("notices", &e),
    };

    Ok(Json(response))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;
    use studyspace_core::{NoticeId, NoticePriority, NoticeTarget};

    use super::*;

    fn notice(
        title: &str,
        department: NoticeTarget,
        priority: NoticePriority,
        age_hours: i64,
        is_active: bool,
    ) -> Notice {
        Notice {
            id: NoticeId::random(),
            title: title.to_owned(),
            content: format!("{title} details"),
            department,
            priority,
            file_url: None,
            file_type: None,
            expires_at: None,
            created_by: "Dean".to_owned(),
            is_active,
            created_at: Utc::now() - TimeDelta::hours(age_hours),
        }
    }

    fn sample() -> Vec<Notice> {
        vec![
            notice("Holiday", NoticeTarget::All, NoticePriority::Normal, 1, true),
            notice(
                "CSE lab",
                NoticeTarget::Department(Department::Cse),
                NoticePriority::Urgent,
                5,
                true,
            ),
            notice(
                "ECE seminar",
                NoticeTarget::Department(Department::Ece),
                NoticePriority::High,
                2,
                false,
            ),
        ]
    }

    fn titles(views: &[NoticeView]) -> Vec<&str> {
        views.iter().map(|v| v.notice.title.as_str()).collect()
    }

    #[test]
    fn test_department_filter_includes_all() {
        let (views, counts) = present(
            sample(),
            Some(Department::Cse),
            None,
            NoticeSort::Newest,
            Utc::now(),
        );
        assert_eq!(titles(&views), ["Holiday", "CSE lab"]);
        assert_eq!(
            counts,
            NoticeCounts {
                total: 3,
                active: 2,
                hidden: 1,
            }
        );
    }

    #[test]
    fn test_priority_sort_and_search() {
        let (views, _) = present(sample(), None, None, NoticeSort::Priority, Utc::now());
        assert_eq!(titles(&views), ["CSE lab", "ECE seminar", "Holiday"]);

        let (views, _) = present(sample(), None, Some("  SEMINAR "), NoticeSort::Oldest, Utc::now());
        assert_eq!(titles(&views), ["ECE seminar"]);
    }

    #[test]
    fn test_is_expired_is_serialized() {
        let mut notices = sample();
        notices[0].expires_at = Some(Utc::now() - TimeDelta::minutes(1));
        let (views, _) = present(notices, None, None, NoticeSort::Newest, Utc::now());

        let value = serde_json::to_value(&views).unwrap();
        assert_eq!(value[0]["isExpired"], true);
        assert_eq!(value[1]["isExpired"], false);
        assert_eq!(value[0]["department"], "all");
    }
}
