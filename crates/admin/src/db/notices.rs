//! Notice repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use studyspace_core::{NoticeFileType, NoticeId, NoticePriority, NoticeTarget};

use super::{RepositoryError, parse_column, parse_optional_column};
use crate::models::{NewNotice, Notice};

#[derive(Debug, sqlx::FromRow)]
struct NoticeRow {
    id: Uuid,
    title: String,
    content: String,
    department: String,
    priority: String,
    file_url: Option<String>,
    file_type: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    created_by: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NoticeRow> for Notice {
    type Error = RepositoryError;

    fn try_from(row: NoticeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NoticeId::new(row.id),
            title: row.title,
            content: row.content,
            department: parse_column::<NoticeTarget>("notice department", &row.department)?,
            priority: parse_column::<NoticePriority>("notice priority", &row.priority)?,
            file_url: row.file_url,
            file_type: parse_optional_column::<NoticeFileType>(
                "notice file type",
                row.file_type.as_deref(),
            )?,
            expires_at: row.expires_at,
            created_by: row.created_by,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const RETURNING: &str = "RETURNING id, title, content, department, priority, file_url, \
                         file_type, expires_at, created_by, is_active, created_at";

/// Repository for notice database operations.
pub struct NoticeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NoticeRepository<'a> {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every notice, newest first. Visibility and search are applied by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_all(&self) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(
            "SELECT * FROM studyspace.notices ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Insert a notice. New notices are always active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, notice: &NewNotice) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "INSERT INTO studyspace.notices \
                 (title, content, department, priority, file_url, file_type, expires_at, \
                  created_by, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE) \
             {RETURNING}"
        ))
        .bind(&notice.title)
        .bind(&notice.content)
        .bind(notice.department.code())
        .bind(notice.priority.as_str())
        .bind(notice.file_url.as_deref())
        .bind(notice.file_type.map(NoticeFileType::as_str))
        .bind(notice.expires_at)
        .bind(&notice.created_by)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Show or hide a notice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_active(
        &self,
        id: NoticeId,
        is_active: bool,
    ) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "UPDATE studyspace.notices SET is_active = $2 WHERE id = $1 {RETURNING}"
        ))
        .bind(id.as_uuid())
        .bind(is_active)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete one notice, returning the deleted row if it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: NoticeId) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "DELETE FROM studyspace.notices WHERE id = $1 {RETURNING}"
        ))
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
