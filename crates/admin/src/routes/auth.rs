//! Authentication route handlers for admin.
//!
//! Login exchanges a plaintext admin secret for a server-side session. The
//! session payload includes the key hash, which the dashboard sends with
//! every relay call.

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use studyspace_core::permissions::{allowed_departments, allowed_notice_targets, allowed_subjects};
use studyspace_core::{Department, NoticeTarget};

use crate::db::PgStore;
use crate::error::AppError;
use crate::middleware::RequireAdminSession;
use crate::models::AdminSession;
use crate::services::auth::AdminSessionStore;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session_info))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub secret_key: String,
}

/// Session plus the scope the dashboard uses to hide disallowed controls.
///
/// The relay re-checks every scoped action; this is presentation only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub session: AdminSession,
    pub allowed_departments: Vec<Department>,
    pub allowed_notice_targets: Vec<NoticeTarget>,
    pub allowed_subjects: BTreeMap<Department, Vec<String>>,
}

impl From<AdminSession> for SessionView {
    fn from(session: AdminSession) -> Self {
        let identity = &session.identity;
        let departments = allowed_departments(identity);
        let allowed_subjects = departments
            .iter()
            .map(|&department| {
                let subjects = allowed_subjects(identity, department)
                    .into_iter()
                    .map(str::to_owned)
                    .collect();
                (department, subjects)
            })
            .collect();

        Self {
            allowed_departments: departments.into_iter().collect(),
            allowed_notice_targets: allowed_notice_targets(identity),
            allowed_subjects,
            session,
        }
    }
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AdminSession>, AppError> {
    let store = PgStore::new(state.pool());
    let admin = AdminSessionStore::new(&session)
        .login(&store, &body.secret_key, Utc::now())
        .await?;

    Ok(Json(admin))
}

/// POST /api/auth/logout
async fn logout(session: Session) -> Result<StatusCode, AppError> {
    AdminSessionStore::new(&session).logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/session
async fn session_info(RequireAdminSession(admin): RequireAdminSession) -> Json<SessionView> {
    Json(admin.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use studyspace_core::{AdminIdentity, AdminKeyId, AdminRole, KeyHash};

    use super::*;

    fn session(role: AdminRole, department: Option<Department>, subject: Option<&str>) -> AdminSession {
        AdminSession::start(
            AdminIdentity {
                id: AdminKeyId::random(),
                key_hash: KeyHash::from_secret("k"),
                admin_name: "Prof. Das".to_owned(),
                role,
                department,
                subject: subject.map(str::to_owned),
                college_id: None,
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_dept_admin_view() {
        let view = SessionView::from(session(
            AdminRole::DeptAdmin,
            Some(Department::Aiml),
            Some("Deep Learning"),
        ));
        let value = serde_json::to_value(&view).unwrap();

        assert_eq!(value["admin_name"], "Prof. Das");
        assert_eq!(value["allowedDepartments"], serde_json::json!(["aiml"]));
        assert_eq!(value["allowedNoticeTargets"], serde_json::json!(["aiml"]));
        assert_eq!(
            value["allowedSubjects"],
            serde_json::json!({ "aiml": ["Deep Learning"] })
        );
    }

    #[test]
    fn test_super_admin_view() {
        let view = SessionView::from(session(AdminRole::SuperAdmin, None, None));

        assert_eq!(view.allowed_departments.len(), Department::ALL.len());
        assert_eq!(view.allowed_notice_targets[0], NoticeTarget::All);
        assert_eq!(
            view.allowed_subjects.get(&Department::Me).map(Vec::len),
            Some(Department::Me.subjects().len())
        );
    }
}
