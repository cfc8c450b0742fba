//! Relay endpoint for privileged mutations.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};

use crate::db::PgStore;
use crate::services::relay::{Relay, RelayError};
use crate::state::AppState;

/// Build the relay router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin", post(relay))
        .route("/api/admin", post(relay))
}

/// POST /admin
///
/// The body is read raw so a malformed envelope maps to the relay's own
/// 400 instead of the JSON extractor's rejection.
async fn relay(State(state): State<AppState>, body: Bytes) -> Response {
    let Ok(body) = serde_json::from_slice::<Value>(&body) else {
        return RelayError::MissingEnvelope.into_response();
    };

    let store = PgStore::new(state.pool());
    match Relay::new(&store).handle(body).await {
        Ok(outcome) => {
            if let (Some(file_url), Some(storage)) = (outcome.orphaned_file, state.storage()) {
                let storage = storage.clone();
                tokio::spawn(async move { storage.remove_orphan(&file_url).await });
            }
            Json(json!({ "success": true, "data": outcome.data })).into_response()
        }
        Err(e) => e.into_response(),
    }
}
