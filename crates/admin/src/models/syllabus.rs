//! Syllabus domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use studyspace_core::{Department, SyllabusId};

/// An uploaded syllabus document.
#[derive(Debug, Clone, Serialize)]
pub struct Syllabus {
    pub id: SyllabusId,
    pub semester: String,
    pub branch: Department,
    pub subject: String,
    pub title: String,
    pub pdf_url: String,
    pub academic_year: Option<String>,
    pub uploaded_by: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new syllabus record.
#[derive(Debug, Clone)]
pub struct NewSyllabus {
    pub semester: String,
    pub branch: Department,
    pub subject: String,
    pub title: String,
    pub pdf_url: String,
    pub academic_year: Option<String>,
    pub uploaded_by: String,
}

/// Equality filters for syllabus reads.
#[derive(Debug, Clone, Default)]
pub struct SyllabusFilter {
    pub branch: Option<Department>,
    pub semester: Option<String>,
}
