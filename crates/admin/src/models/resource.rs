//! Study resource domain types and list helpers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use studyspace_core::{Department, ResourceId, ResourceStatus, ResourceType};

/// An uploaded study resource.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    pub id: ResourceId,
    pub title: String,
    pub description: Option<String>,
    pub semester: String,
    /// Department code. Kept as text: student uploads predate the catalog.
    pub branch: String,
    pub subject: String,
    pub chapter: Option<String>,
    pub topic: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    /// `student` or `teacher`.
    pub source: String,
    pub file_url: Option<String>,
    pub video_url: Option<String>,
    pub college_id: Option<String>,
    pub uploaded_by_name: Option<String>,
    pub uploaded_by_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Case-insensitive substring match over title, subject and uploader.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let contains = |haystack: &str| haystack.to_lowercase().contains(needle);

        contains(&self.title)
            || contains(&self.subject)
            || self.uploaded_by_name.as_deref().is_some_and(contains)
            || self.uploaded_by_email.as_deref().is_some_and(contains)
    }
}

/// Fields for a teacher/admin-created resource.
#[derive(Debug, Clone)]
pub struct NewResource {
    pub title: String,
    pub description: Option<String>,
    pub semester: String,
    pub branch: Department,
    pub subject: String,
    pub chapter: Option<String>,
    pub topic: Option<String>,
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    pub source: String,
    pub file_url: Option<String>,
    pub video_url: Option<String>,
    pub college_id: Option<String>,
    pub uploaded_by_name: String,
}

/// Equality filters for resource reads. `None` means unfiltered.
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    pub semester: Option<String>,
    pub branch: Option<String>,
    pub subject: Option<String>,
    pub status: Option<ResourceStatus>,
    pub college_id: Option<String>,
}

/// Moderation counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourceStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub total: usize,
}

impl ResourceStats {
    #[must_use]
    pub fn tally(resources: &[Resource]) -> Self {
        resources.iter().fold(
            Self {
                total: resources.len(),
                ..Self::default()
            },
            |mut stats, resource| {
                match resource.status {
                    ResourceStatus::Pending => stats.pending += 1,
                    ResourceStatus::Approved => stats.approved += 1,
                    ResourceStatus::Rejected => stats.rejected += 1,
                }
                stats
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(title: &str, subject: &str, status: ResourceStatus) -> Resource {
        Resource {
            id: ResourceId::random(),
            title: title.to_string(),
            description: None,
            semester: "3".to_string(),
            branch: "cse".to_string(),
            subject: subject.to_string(),
            chapter: None,
            topic: None,
            resource_type: ResourceType::Notes,
            status,
            source: "student".to_string(),
            file_url: Some("https://files.example.net/a.pdf".to_string()),
            video_url: None,
            college_id: None,
            uploaded_by_name: Some("Priya S".to_string()),
            uploaded_by_email: Some("priya@college.edu".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_matches_search() {
        let r = resource("Unit 2 Notes", "Operating Systems", ResourceStatus::Pending);
        assert!(r.matches_search("unit 2"));
        assert!(r.matches_search("operating"));
        assert!(r.matches_search("priya"));
        assert!(r.matches_search("college.edu"));
        assert!(!r.matches_search("dbms"));
    }

    #[test]
    fn test_matches_search_without_uploader() {
        let mut r = resource("Heaps", "Data Structures", ResourceStatus::Approved);
        r.uploaded_by_name = None;
        r.uploaded_by_email = None;
        assert!(!r.matches_search("priya"));
        assert!(r.matches_search("heap"));
    }

    #[test]
    fn test_tally() {
        let resources = vec![
            resource("a", "DBMS", ResourceStatus::Pending),
            resource("b", "DBMS", ResourceStatus::Pending),
            resource("c", "DBMS", ResourceStatus::Approved),
            resource("d", "DBMS", ResourceStatus::Rejected),
        ];
        assert_eq!(
            ResourceStats::tally(&resources),
            ResourceStats {
                pending: 2,
                approved: 1,
                rejected: 1,
                total: 4,
            }
        );
        assert_eq!(ResourceStats::tally(&[]), ResourceStats::default());
    }

    #[test]
    fn test_type_serializes_under_type_key() {
        let value = serde_json::to_value(resource("a", "DBMS", ResourceStatus::Pending))
            .unwrap_or_default();
        assert_eq!(value["type"], "notes");
        assert_eq!(value["status"], "pending");
    }
}
