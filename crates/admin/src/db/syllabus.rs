//! Syllabus repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use studyspace_core::{Department, SyllabusId};

use super::{RepositoryError, parse_column};
use crate::models::{NewSyllabus, Syllabus, SyllabusFilter};

#[derive(Debug, sqlx::FromRow)]
struct SyllabusRow {
    id: Uuid,
    semester: String,
    branch: String,
    subject: String,
    title: String,
    pdf_url: String,
    academic_year: Option<String>,
    uploaded_by: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SyllabusRow> for Syllabus {
    type Error = RepositoryError;

    fn try_from(row: SyllabusRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SyllabusId::new(row.id),
            semester: row.semester,
            branch: parse_column::<Department>("syllabus branch", &row.branch)?,
            subject: row.subject,
            title: row.title,
            pdf_url: row.pdf_url,
            academic_year: row.academic_year,
            uploaded_by: row.uploaded_by,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const RETURNING: &str = "RETURNING id, semester, branch, subject, title, pdf_url, academic_year, \
                         uploaded_by, is_active, created_at";

/// Repository for syllabus database operations.
pub struct SyllabusRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SyllabusRepository<'a> {
    /// Create a new syllabus repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List syllabus documents matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list(&self, filter: &SyllabusFilter) -> Result<Vec<Syllabus>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT * FROM studyspace.syllabus WHERE TRUE");

        if let Some(branch) = filter.branch {
            query.push(" AND branch = ").push_bind(branch.code());
        }
        if let Some(semester) = &filter.semester {
            query.push(" AND semester = ").push_bind(semester);
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<SyllabusRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Insert a syllabus record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, syllabus: &NewSyllabus) -> Result<Vec<Syllabus>, RepositoryError> {
        let rows = sqlx::query_as::<_, SyllabusRow>(&format!(
            "INSERT INTO studyspace.syllabus \
                 (semester, branch, subject, title, pdf_url, academic_year, uploaded_by, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE) \
             {RETURNING}"
        ))
        .bind(&syllabus.semester)
        .bind(syllabus.branch.code())
        .bind(&syllabus.subject)
        .bind(&syllabus.title)
        .bind(&syllabus.pdf_url)
        .bind(syllabus.academic_year.as_deref())
        .bind(&syllabus.uploaded_by)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete one syllabus record, returning the deleted row if it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: SyllabusId) -> Result<Vec<Syllabus>, RepositoryError> {
        let rows = sqlx::query_as::<_, SyllabusRow>(&format!(
            "DELETE FROM studyspace.syllabus WHERE id = $1 {RETURNING}"
        ))
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
