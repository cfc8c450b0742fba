//! Status and classification enums for moderated entities.
//!
//! All of these are stored as `TEXT` columns; conversion happens through
//! [`std::str::FromStr`] and `as_str()` so a bad value in the database surfaces
//! as a data corruption error rather than a panic.

use serde::{Deserialize, Serialize};

/// Admin role with different scope rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Unrestricted scope across every department and subject.
    SuperAdmin,
    /// Scoped to exactly one department, optionally one subject.
    DeptAdmin,
}

impl AdminRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::DeptAdmin => "dept_admin",
        }
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "dept_admin" => Ok(Self::DeptAdmin),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

/// Moderation status of an uploaded study resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ResourceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid resource status: {s}")),
        }
    }
}

/// Kind of study resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Notes,
    Video,
    /// Previous year question papers.
    Pyq,
}

impl ResourceType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Notes => "notes",
            Self::Video => "video",
            Self::Pyq => "pyq",
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notes" => Ok(Self::Notes),
            "video" => Ok(Self::Video),
            "pyq" => Ok(Self::Pyq),
            _ => Err(format!("invalid resource type: {s}")),
        }
    }
}

/// Notice priority.
///
/// Variants are declared in ascending urgency, so the derived `Ord` sorts
/// `Low < Normal < High < Urgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum NoticePriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl NoticePriority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for NoticePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("invalid notice priority: {s}")),
        }
    }
}

/// Attachment kind on a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeFileType {
    /// Uploaded PDF document.
    Pdf,
    /// External video link.
    Video,
}

impl NoticeFileType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Video => "video",
        }
    }
}

impl std::str::FromStr for NoticeFileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "video" => Ok(Self::Video),
            _ => Err(format!("invalid notice file type: {s}")),
        }
    }
}
