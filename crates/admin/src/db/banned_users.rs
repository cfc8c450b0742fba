//! Banned user repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use studyspace_core::{BannedUserId, Email};

use super::RepositoryError;
use crate::models::{BannedUser, NewBan};

#[derive(Debug, sqlx::FromRow)]
struct BannedUserRow {
    id: Uuid,
    email: String,
    reason: String,
    banned_by: String,
    banned_at: DateTime<Utc>,
}

impl TryFrom<BannedUserRow> for BannedUser {
    type Error = RepositoryError;

    fn try_from(row: BannedUserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: BannedUserId::new(row.id),
            email,
            reason: row.reason,
            banned_by: row.banned_by,
            banned_at: row.banned_at,
        })
    }
}

const RETURNING: &str = "RETURNING id, email, reason, banned_by, banned_at";

/// Repository for banned user database operations.
pub struct BannedUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BannedUserRepository<'a> {
    /// Create a new banned user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every ban, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_all(&self) -> Result<Vec<BannedUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, BannedUserRow>(
            "SELECT * FROM studyspace.banned_users ORDER BY banned_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Ban an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already banned.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn insert(&self, ban: &NewBan) -> Result<Vec<BannedUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, BannedUserRow>(&format!(
            "INSERT INTO studyspace.banned_users (email, reason, banned_by) \
             VALUES ($1, $2, $3) {RETURNING}"
        ))
        .bind(ban.email.as_str())
        .bind(&ban.reason)
        .bind(&ban.banned_by)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Lift the ban on an email. Unknown emails return an empty set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_by_email(&self, email: &Email) -> Result<Vec<BannedUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, BannedUserRow>(&format!(
            "DELETE FROM studyspace.banned_users WHERE email = $1 {RETURNING}"
        ))
        .bind(email.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
