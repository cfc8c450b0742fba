//! Database operations for the StudySpace data store.
//!
//! # Schema: `studyspace`
//!
//! ## Tables
//!
//! - `admin_keys` - Hashed admin keys with role and scope
//! - `resources` - Student and teacher uploaded study resources
//! - `notices` - Departmental notices
//! - `syllabus` - Syllabus documents
//! - `banned_users` - Banned student emails
//! - `session` - Admin session storage (tower-sessions)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p studyspace-cli -- migrate
//! ```
//!
//! # Access Pattern
//!
//! Reads go straight to the repositories. Every mutation goes through the
//! [`AdminStore`] trait so the relay and the session store can run against
//! Postgres ([`PgStore`]) or the in-memory [`memory::MemoryStore`].

pub mod admin_keys;
pub mod banned_users;
pub mod memory;
pub mod notices;
pub mod resources;
pub mod syllabus;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use studyspace_core::{
    AdminKeyId, Email, KeyHash, NoticeId, ResourceId, ResourceStatus, SyllabusId,
};

use crate::models::{
    AdminKeyRecord, BannedUser, NewBan, NewNotice, NewResource, NewSyllabus, Notice, Resource,
    Syllabus,
};

pub use admin_keys::AdminKeyRepository;
pub use banned_users::BannedUserRepository;
pub use memory::MemoryStore;
pub use notices::NoticeRepository;
pub use resources::ResourceRepository;
pub use syllabus::SyllabusRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., email already banned).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The backing store refused the operation.
    #[error("data store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Map unique-constraint violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_owned())
            }
            _ => Self::Database(err),
        }
    }
}

/// Key lookups and privileged mutations.
///
/// Each mutation is a single-row statement whose affected rows are returned;
/// the store's own row-level atomicity is the only consistency boundary.
pub trait AdminStore: Send + Sync {
    /// Find an active key record by digest.
    fn find_active_key(
        &self,
        key_hash: &KeyHash,
    ) -> impl Future<Output = Result<Option<AdminKeyRecord>, RepositoryError>> + Send;

    /// Record that a key was just used to log in.
    fn touch_key(
        &self,
        id: AdminKeyId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    fn update_resource_status(
        &self,
        id: ResourceId,
        status: ResourceStatus,
    ) -> impl Future<Output = Result<Vec<Resource>, RepositoryError>> + Send;

    fn insert_resource(
        &self,
        resource: NewResource,
    ) -> impl Future<Output = Result<Vec<Resource>, RepositoryError>> + Send;

    fn delete_resource(
        &self,
        id: ResourceId,
    ) -> impl Future<Output = Result<Vec<Resource>, RepositoryError>> + Send;

    fn insert_notice(
        &self,
        notice: NewNotice,
    ) -> impl Future<Output = Result<Vec<Notice>, RepositoryError>> + Send;

    fn set_notice_active(
        &self,
        id: NoticeId,
        is_active: bool,
    ) -> impl Future<Output = Result<Vec<Notice>, RepositoryError>> + Send;

    fn delete_notice(
        &self,
        id: NoticeId,
    ) -> impl Future<Output = Result<Vec<Notice>, RepositoryError>> + Send;

    fn insert_syllabus(
        &self,
        syllabus: NewSyllabus,
    ) -> impl Future<Output = Result<Vec<Syllabus>, RepositoryError>> + Send;

    fn delete_syllabus(
        &self,
        id: SyllabusId,
    ) -> impl Future<Output = Result<Vec<Syllabus>, RepositoryError>> + Send;

    fn insert_ban(
        &self,
        ban: NewBan,
    ) -> impl Future<Output = Result<Vec<BannedUser>, RepositoryError>> + Send;

    /// Delete-if-exists: an email with no ban yields an empty set.
    fn delete_ban(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Vec<BannedUser>, RepositoryError>> + Send;
}

/// [`AdminStore`] backed by the Postgres repositories.
#[derive(Clone, Copy)]
pub struct PgStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgStore<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl AdminStore for PgStore<'_> {
    async fn find_active_key(
        &self,
        key_hash: &KeyHash,
    ) -> Result<Option<AdminKeyRecord>, RepositoryError> {
        AdminKeyRepository::new(self.pool)
            .find_active_by_hash(key_hash)
            .await
    }

    async fn touch_key(&self, id: AdminKeyId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        AdminKeyRepository::new(self.pool).touch(id, at).await
    }

    async fn update_resource_status(
        &self,
        id: ResourceId,
        status: ResourceStatus,
    ) -> Result<Vec<Resource>, RepositoryError> {
        ResourceRepository::new(self.pool)
            .update_status(id, status)
            .await
    }

    async fn insert_resource(&self, resource: NewResource) -> Result<Vec<Resource>, RepositoryError> {
        ResourceRepository::new(self.pool).insert(&resource).await
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<Vec<Resource>, RepositoryError> {
        ResourceRepository::new(self.pool).delete(id).await
    }

    async fn insert_notice(&self, notice: NewNotice) -> Result<Vec<Notice>, RepositoryError> {
        NoticeRepository::new(self.pool).insert(&notice).await
    }

    async fn set_notice_active(
        &self,
        id: NoticeId,
        is_active: bool,
    ) -> Result<Vec<Notice>, RepositoryError> {
        NoticeRepository::new(self.pool)
            .set_active(id, is_active)
            .await
    }

    async fn delete_notice(&self, id: NoticeId) -> Result<Vec<Notice>, RepositoryError> {
        NoticeRepository::new(self.pool).delete(id).await
    }

    async fn insert_syllabus(&self, syllabus: NewSyllabus) -> Result<Vec<Syllabus>, RepositoryError> {
        SyllabusRepository::new(self.pool).insert(&syllabus).await
    }

    async fn delete_syllabus(&self, id: SyllabusId) -> Result<Vec<Syllabus>, RepositoryError> {
        SyllabusRepository::new(self.pool).delete(id).await
    }

    async fn insert_ban(&self, ban: NewBan) -> Result<Vec<BannedUser>, RepositoryError> {
        BannedUserRepository::new(self.pool).insert(&ban).await
    }

    async fn delete_ban(&self, email: &Email) -> Result<Vec<BannedUser>, RepositoryError> {
        BannedUserRepository::new(self.pool)
            .delete_by_email(email)
            .await
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a `TEXT` column into a domain enum, reporting bad values as corruption.
pub(crate) fn parse_column<T>(column: &str, value: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

/// Like [`parse_column`] for nullable columns.
pub(crate) fn parse_optional_column<T>(
    column: &str,
    value: Option<&str>,
) -> Result<Option<T>, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map(|v| parse_column(column, v)).transpose()
}
