//! Admin key repository.
//!
//! Secrets never reach this module: lookups and inserts take a [`KeyHash`].

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use studyspace_core::{AdminKeyId, AdminRole, Department, KeyHash};

use super::{RepositoryError, parse_column, parse_optional_column};
use crate::models::{AdminKeyRecord, NewAdminKey};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AdminKeyRow {
    id: Uuid,
    key_hash: String,
    admin_name: String,
    role: String,
    department: Option<String>,
    subject: Option<String>,
    college_id: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_used: Option<DateTime<Utc>>,
}

impl TryFrom<AdminKeyRow> for AdminKeyRecord {
    type Error = RepositoryError;

    fn try_from(row: AdminKeyRow) -> Result<Self, Self::Error> {
        let key_hash = KeyHash::from_hex(row.key_hash);
        if !key_hash.is_well_formed() {
            return Err(RepositoryError::DataCorruption(format!(
                "malformed key hash for admin key {}",
                row.id
            )));
        }

        Ok(Self {
            id: AdminKeyId::new(row.id),
            key_hash,
            admin_name: row.admin_name,
            role: parse_column::<AdminRole>("role", &row.role)?,
            department: parse_optional_column::<Department>(
                "department",
                row.department.as_deref(),
            )?,
            subject: row.subject,
            college_id: row.college_id,
            is_active: row.is_active,
            created_at: row.created_at,
            last_used: row.last_used,
        })
    }
}

const SELECT_COLUMNS: &str = "id, key_hash, admin_name, role, department, subject, college_id, \
                              is_active, created_at, last_used";

// =============================================================================
// Repository
// =============================================================================

/// Repository for admin key database operations.
pub struct AdminKeyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminKeyRepository<'a> {
    /// Create a new admin key repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up an active key by digest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn find_active_by_hash(
        &self,
        key_hash: &KeyHash,
    ) -> Result<Option<AdminKeyRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminKeyRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM studyspace.admin_keys \
             WHERE key_hash = $1 AND is_active = TRUE"
        ))
        .bind(key_hash.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Stamp `last_used` on a key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn touch(&self, id: AdminKeyId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE studyspace.admin_keys SET last_used = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(at)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// List every key, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_all(&self) -> Result<Vec<AdminKeyRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminKeyRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM studyspace.admin_keys ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Issue a new key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the digest already exists.
    /// Returns `RepositoryError::Database` for other failures.
    pub async fn create(&self, key: &NewAdminKey) -> Result<AdminKeyRecord, RepositoryError> {
        let row = sqlx::query_as::<_, AdminKeyRow>(&format!(
            "INSERT INTO studyspace.admin_keys \
                 (key_hash, admin_name, role, department, subject, college_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(key.key_hash.as_str())
        .bind(&key.admin_name)
        .bind(key.role.as_str())
        .bind(key.department.map(Department::code))
        .bind(key.subject.as_deref())
        .bind(key.college_id.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        row.try_into()
    }

    /// Deactivate every active key issued to `admin_name`.
    ///
    /// Returns the number of keys revoked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn deactivate_by_name(&self, admin_name: &str) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE studyspace.admin_keys SET is_active = FALSE \
             WHERE admin_name = $1 AND is_active = TRUE",
        )
        .bind(admin_name)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
