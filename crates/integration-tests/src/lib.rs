//! Integration tests for the StudySpace admin service.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p studyspace-integration-tests
//! ```
//!
//! No database is needed. Relay and session tests run against the in-memory
//! [`MemoryStore`]; HTTP tests build the real router over a pool that points
//! at a closed port, so reads exercise their degraded path.
//!
//! # Test Categories
//!
//! - `relay_scenarios` - Moderation flows through the relay
//! - `session_lifecycle` - Login, expiry and logout
//! - `permissions` - Scope rules over the whole catalog
//! - `http_api` - Router wiring, headers and status codes

use std::time::Duration;

use axum::Router;
use chrono::{DateTime, SubsecRound, Utc};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower_sessions::{MemoryStore as SessionMemoryStore, Session, SessionManagerLayer};
use url::Url;

use studyspace_admin::config::{AdminConfig, FileHostConfig};
use studyspace_admin::db::MemoryStore;
use studyspace_admin::models::{AdminKeyRecord, NewAdminKey};
use studyspace_admin::state::AppState;
use studyspace_core::{AdminRole, Department, KeyHash};

/// Nothing listens here; every connection attempt is refused.
const UNREACHABLE_DATABASE_URL: &str = "postgres://studyspace@127.0.0.1:1/studyspace";

/// Current time at the millisecond precision sessions are stored with.
#[must_use]
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Hex digest the dashboard sends as `keyHash` for `secret`.
#[must_use]
pub fn key_hash(secret: &str) -> String {
    KeyHash::from_secret(secret).as_str().to_owned()
}

/// Issue a key for `secret` into `store`.
pub async fn issue_key(
    store: &MemoryStore,
    secret: &str,
    admin_name: &str,
    role: AdminRole,
    department: Option<Department>,
    subject: Option<&str>,
) -> AdminKeyRecord {
    store
        .insert_key(NewAdminKey {
            key_hash: KeyHash::from_secret(secret),
            admin_name: admin_name.to_owned(),
            role,
            department,
            subject: subject.map(str::to_owned),
            college_id: Some("gec-thrissur".to_owned()),
        })
        .await
}

/// A fresh session backed by an in-memory session store.
#[must_use]
pub fn session() -> Session {
    Session::new(None, std::sync::Arc::new(SessionMemoryStore::default()), None)
}

/// Configuration that never reaches a real service.
///
/// # Panics
///
/// Panics if the hardcoded URLs fail to parse.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_config() -> AdminConfig {
    AdminConfig {
        database_url: SecretString::from(UNREACHABLE_DATABASE_URL),
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        base_url: "http://localhost:3001".to_owned(),
        file_host: FileHostConfig {
            upload_url: Url::parse("http://127.0.0.1:1/upload").unwrap(),
            upload_preset: "studyspace_unsigned".to_owned(),
            folder: "admin-studyspace".to_owned(),
        },
        storage: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    }
}

/// The full router over an unreachable database and in-memory sessions.
///
/// # Panics
///
/// Panics if the lazy pool or the application state cannot be built.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_app() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy(UNREACHABLE_DATABASE_URL)
        .unwrap();
    let state = AppState::new(&test_config(), pool).unwrap();
    let session_layer = SessionManagerLayer::new(SessionMemoryStore::default());

    studyspace_admin::app(state, session_layer)
}
