//! Study resource repository.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use studyspace_core::{ResourceId, ResourceStatus, ResourceType};

use super::{RepositoryError, parse_column};
use crate::models::{NewResource, Resource, ResourceFilter};

#[derive(Debug, sqlx::FromRow)]
struct ResourceRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    semester: String,
    branch: String,
    subject: String,
    chapter: Option<String>,
    topic: Option<String>,
    #[sqlx(rename = "type")]
    resource_type: String,
    status: String,
    source: String,
    file_url: Option<String>,
    video_url: Option<String>,
    college_id: Option<String>,
    uploaded_by_name: Option<String>,
    uploaded_by_email: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ResourceRow> for Resource {
    type Error = RepositoryError;

    fn try_from(row: ResourceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ResourceId::new(row.id),
            title: row.title,
            description: row.description,
            semester: row.semester,
            branch: row.branch,
            subject: row.subject,
            chapter: row.chapter,
            topic: row.topic,
            resource_type: parse_column::<ResourceType>("resource type", &row.resource_type)?,
            status: parse_column::<ResourceStatus>("resource status", &row.status)?,
            source: row.source,
            file_url: row.file_url,
            video_url: row.video_url,
            college_id: row.college_id,
            uploaded_by_name: row.uploaded_by_name,
            uploaded_by_email: row.uploaded_by_email,
            created_at: row.created_at,
        })
    }
}

const RETURNING: &str = "RETURNING id, title, description, semester, branch, subject, chapter, \
                         topic, type, status, source, file_url, video_url, college_id, \
                         uploaded_by_name, uploaded_by_email, created_at";

/// Repository for resource database operations.
pub struct ResourceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResourceRepository<'a> {
    /// Create a new resource repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List resources matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list(&self, filter: &ResourceFilter) -> Result<Vec<Resource>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT * FROM studyspace.resources WHERE TRUE");

        if let Some(college_id) = &filter.college_id {
            query.push(" AND college_id = ").push_bind(college_id);
        }
        if let Some(semester) = &filter.semester {
            query.push(" AND semester = ").push_bind(semester);
        }
        if let Some(branch) = &filter.branch {
            query.push(" AND branch = ").push_bind(branch);
        }
        if let Some(subject) = &filter.subject {
            query.push(" AND subject = ").push_bind(subject);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<ResourceRow>()
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Distinct non-empty subjects of resources in `branch`, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn distinct_subjects(
        &self,
        branch: &str,
        college_id: Option<&str>,
    ) -> Result<Vec<String>, RepositoryError> {
        let mut query: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT DISTINCT subject FROM studyspace.resources WHERE subject <> '' AND branch = ",
        );
        query.push_bind(branch);
        if let Some(college_id) = college_id {
            query.push(" AND college_id = ").push_bind(college_id);
        }
        query.push(" ORDER BY subject");

        let subjects = query
            .build_query_scalar::<String>()
            .fetch_all(self.pool)
            .await?;

        Ok(subjects)
    }

    /// Set the moderation status of one resource.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: ResourceId,
        status: ResourceStatus,
    ) -> Result<Vec<Resource>, RepositoryError> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "UPDATE studyspace.resources SET status = $2 WHERE id = $1 {RETURNING}"
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Insert a resource.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, resource: &NewResource) -> Result<Vec<Resource>, RepositoryError> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "INSERT INTO studyspace.resources \
                 (title, description, semester, branch, subject, chapter, topic, type, status, \
                  source, file_url, video_url, college_id, uploaded_by_name) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             {RETURNING}"
        ))
        .bind(&resource.title)
        .bind(resource.description.as_deref())
        .bind(&resource.semester)
        .bind(resource.branch.code())
        .bind(&resource.subject)
        .bind(resource.chapter.as_deref())
        .bind(resource.topic.as_deref())
        .bind(resource.resource_type.as_str())
        .bind(resource.status.as_str())
        .bind(&resource.source)
        .bind(resource.file_url.as_deref())
        .bind(resource.video_url.as_deref())
        .bind(resource.college_id.as_deref())
        .bind(&resource.uploaded_by_name)
        .fetch_all(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete one resource, returning the deleted row if it existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ResourceId) -> Result<Vec<Resource>, RepositoryError> {
        let rows = sqlx::query_as::<_, ResourceRow>(&format!(
            "DELETE FROM studyspace.resources WHERE id = $1 {RETURNING}"
        ))
        .bind(id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
