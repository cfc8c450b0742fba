//! Notice domain types and list helpers.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use studyspace_core::{Department, NoticeFileType, NoticeId, NoticePriority, NoticeTarget};

/// A departmental notice.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    pub department: NoticeTarget,
    pub priority: NoticePriority,
    pub file_url: Option<String>,
    pub file_type: Option<NoticeFileType>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    /// Hidden notices stay in the table but are not shown to students.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Notice {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }

    /// Case-insensitive substring match over title and content.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }

    /// Stored PDF attachment that becomes orphaned once this notice is gone.
    #[must_use]
    pub fn stored_file(&self) -> Option<&str> {
        match self.file_type {
            Some(NoticeFileType::Pdf) => self.file_url.as_deref(),
            Some(NoticeFileType::Video) | None => None,
        }
    }
}

/// Fields for a new notice.
#[derive(Debug, Clone)]
pub struct NewNotice {
    pub title: String,
    pub content: String,
    pub department: NoticeTarget,
    pub priority: NoticePriority,
    pub file_url: Option<String>,
    pub file_type: Option<NoticeFileType>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
}

/// Ordering for the notice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSort {
    #[default]
    Newest,
    Oldest,
    /// Most urgent first; ties keep newest first.
    Priority,
}

impl NoticeSort {
    pub fn apply(self, notices: &mut [Notice]) {
        match self {
            Self::Newest => notices.sort_by_key(|n| Reverse(n.created_at)),
            Self::Oldest => notices.sort_by_key(|n| n.created_at),
            Self::Priority => {
                notices.sort_by_key(|n| Reverse(n.created_at));
                notices.sort_by_key(|n| Reverse(n.priority));
            }
        }
    }
}

/// Keep notices visible to `department`, including those addressed to `all`.
#[must_use]
pub fn visible_to(notices: Vec<Notice>, department: Option<Department>) -> Vec<Notice> {
    match department {
        None => notices,
        Some(department) => notices
            .into_iter()
            .filter(|n| n.department.reaches(department))
            .collect(),
    }
}

/// Visibility counters for the notice list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoticeCounts {
    pub total: usize,
    pub active: usize,
    pub hidden: usize,
}

impl NoticeCounts {
    #[must_use]
    pub fn tally(notices: &[Notice]) -> Self {
        let active = notices.iter().filter(|n| n.is_active).count();
        Self {
            total: notices.len(),
            active,
            hidden: notices.len() - active,
        }
    }
}
