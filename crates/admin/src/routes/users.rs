//! Banned user read endpoint.

use axum::{Json, Router, extract::State, routing::get};

use crate::db::BannedUserRepository;
use crate::middleware::RequireAdminSession;
use crate::models::BannedUser;
use crate::state::AppState;

use super::ListResponse;

/// Build the banned users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/banned-users", get(list_banned_users))
}

/// GET /api/banned-users
async fn list_banned_users(
    RequireAdminSession(_admin): RequireAdminSession,
    State(state): State<AppState>,
) -> Json<ListResponse<BannedUser>> {
    let response = match BannedUserRepository::new(state.pool()).list_all().await {
        Ok(items) => ListResponse::loaded(items, ()),
        Err(e) => ListResponse::degraded("banned users", &e),
    };

    Json(response)
}
