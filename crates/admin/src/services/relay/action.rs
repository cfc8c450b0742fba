//! Relay actions.
//!
//! The wire format is a flat JSON object: `{"action": tag, "keyHash": ..., ...payload}`.
//! [`AdminAction`] deserializes the whole object (the `keyHash` field is
//! ignored) into one closed enum, so adding an action forces every match
//! in the relay to handle it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, de};

use studyspace_core::{
    Department, Email, NoticeFileType, NoticeId, NoticePriority, NoticeTarget, ResourceId,
    ResourceStatus, ResourceType, SyllabusId,
};

/// The action tags the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    UpdateResourceStatus,
    DeleteResource,
    CreateResource,
    CreateNotice,
    ToggleNotice,
    DeleteNotice,
    UploadSyllabus,
    DeleteSyllabus,
    BanUser,
    UnbanUser,
}

impl ActionKind {
    pub const ALL: [Self; 10] = [
        Self::UpdateResourceStatus,
        Self::DeleteResource,
        Self::CreateResource,
        Self::CreateNotice,
        Self::ToggleNotice,
        Self::DeleteNotice,
        Self::UploadSyllabus,
        Self::DeleteSyllabus,
        Self::BanUser,
        Self::UnbanUser,
    ];

    /// Wire tag, as sent in the `action` field.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::UpdateResourceStatus => "update_resource_status",
            Self::DeleteResource => "delete_resource",
            Self::CreateResource => "create_resource",
            Self::CreateNotice => "create_notice",
            Self::ToggleNotice => "toggle_notice",
            Self::DeleteNotice => "delete_notice",
            Self::UploadSyllabus => "upload_syllabus",
            Self::DeleteSyllabus => "delete_syllabus",
            Self::BanUser => "ban_user",
            Self::UnbanUser => "unban_user",
        }
    }

    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A privileged mutation with its payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum AdminAction {
    UpdateResourceStatus {
        resource_id: ResourceId,
        new_status: ResourceStatus,
    },
    DeleteResource {
        resource_id: ResourceId,
    },
    /// Teacher/admin upload, published without moderation.
    CreateResource {
        title: String,
        semester: String,
        branch: Department,
        subject: String,
        #[serde(rename = "type")]
        resource_type: ResourceType,
        #[serde(default, deserialize_with = "blank_as_none")]
        file_url: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none")]
        video_url: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none")]
        description: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none")]
        chapter: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none")]
        topic: Option<String>,
    },
    CreateNotice {
        title: String,
        content: String,
        department: NoticeTarget,
        #[serde(default)]
        priority: NoticePriority,
        #[serde(default, deserialize_with = "blank_as_none")]
        file_url: Option<String>,
        #[serde(default, deserialize_with = "blank_as_none")]
        file_type: Option<NoticeFileType>,
        #[serde(default, deserialize_with = "expiry")]
        expires_at: Option<DateTime<Utc>>,
    },
    ToggleNotice {
        notice_id: NoticeId,
        is_active: bool,
    },
    DeleteNotice {
        notice_id: NoticeId,
    },
    UploadSyllabus {
        semester: String,
        branch: Department,
        subject: String,
        title: String,
        pdf_url: String,
        #[serde(default, deserialize_with = "blank_as_none")]
        academic_year: Option<String>,
    },
    DeleteSyllabus {
        syllabus_id: SyllabusId,
    },
    BanUser {
        email: Email,
        #[serde(default, deserialize_with = "blank_as_none")]
        reason: Option<String>,
    },
    UnbanUser {
        email: Email,
    },
}

impl AdminAction {
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::UpdateResourceStatus { .. } => ActionKind::UpdateResourceStatus,
            Self::DeleteResource { .. } => ActionKind::DeleteResource,
            Self::CreateResource { .. } => ActionKind::CreateResource,
            Self::CreateNotice { .. } => ActionKind::CreateNotice,
            Self::ToggleNotice { .. } => ActionKind::ToggleNotice,
            Self::DeleteNotice { .. } => ActionKind::DeleteNotice,
            Self::UploadSyllabus { .. } => ActionKind::UploadSyllabus,
            Self::DeleteSyllabus { .. } => ActionKind::DeleteSyllabus,
            Self::BanUser { .. } => ActionKind::BanUser,
            Self::UnbanUser { .. } => ActionKind::UnbanUser,
        }
    }

    /// Field-level checks serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending field.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::UpdateResourceStatus { .. }
            | Self::DeleteResource { .. }
            | Self::ToggleNotice { .. }
            | Self::DeleteNotice { .. }
            | Self::DeleteSyllabus { .. }
            | Self::BanUser { .. }
            | Self::UnbanUser { .. } => Ok(()),
            Self::CreateResource {
                title,
                semester,
                subject,
                resource_type,
                file_url,
                video_url,
                ..
            } => {
                require("title", title)?;
                require("semester", semester)?;
                require("subject", subject)?;
                match resource_type {
                    ResourceType::Video if video_url.is_none() => {
                        Err("videoUrl is required for video resources".to_owned())
                    }
                    ResourceType::Notes | ResourceType::Pyq if file_url.is_none() => {
                        Err("fileUrl is required for file resources".to_owned())
                    }
                    _ => Ok(()),
                }
            }
            Self::CreateNotice {
                title,
                content,
                file_url,
                file_type,
                ..
            } => {
                require("title", title)?;
                require("content", content)?;
                if file_type.is_some() && file_url.is_none() {
                    return Err("fileUrl is required when fileType is set".to_owned());
                }
                Ok(())
            }
            Self::UploadSyllabus {
                semester,
                subject,
                title,
                pdf_url,
                ..
            } => {
                require("semester", semester)?;
                require("title", title)?;
                require("pdfUrl", pdf_url)?;
                require("subject", subject)
            }
        }
    }
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} is required"))
    } else {
        Ok(())
    }
}

/// Treat a missing, `null` or whitespace-only string as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

/// Expiry as RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
fn expiry<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = blank_as_none::<D, String>(deserializer)? else {
        return Ok(None);
    };

    if let Ok(at) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(at.with_timezone(&Utc)));
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Some(midnight.and_utc()))
        .ok_or_else(|| de::Error::custom(format!("invalid expiresAt: {raw}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn parse(value: serde_json::Value) -> Result<AdminAction, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_tags_round_trip() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ActionKind::from_tag("bogus_action"), None);
    }

    #[test]
    fn test_parses_camel_case_payload_and_ignores_key_hash() {
        let id = ResourceId::random();
        let action = parse(json!({
            "action": "update_resource_status",
            "keyHash": "ab12",
            "resourceId": id,
            "newStatus": "approved",
        }))
        .unwrap();

        assert_eq!(action.kind(), ActionKind::UpdateResourceStatus);
        assert!(matches!(
            action,
            AdminAction::UpdateResourceStatus { resource_id, new_status: ResourceStatus::Approved }
                if resource_id == id
        ));
    }

    #[test]
    fn test_notice_defaults_and_blank_fields() {
        let action = parse(json!({
            "action": "create_notice",
            "title": "Mid-sem schedule",
            "content": "Exams start Monday",
            "department": "all",
            "fileUrl": "",
            "fileType": "",
            "expiresAt": "",
        }))
        .unwrap();

        let AdminAction::CreateNotice {
            department,
            priority,
            file_url,
            file_type,
            expires_at,
            ..
        } = action
        else {
            panic!("expected create_notice");
        };
        assert_eq!(department, NoticeTarget::All);
        assert_eq!(priority, NoticePriority::Normal);
        assert_eq!(file_url, None);
        assert_eq!(file_type, None);
        assert_eq!(expires_at, None);
    }

    #[test]
    fn test_expiry_formats() {
        let notice = |expires: &str| {
            parse(json!({
                "action": "create_notice",
                "title": "t",
                "content": "c",
                "department": "cse",
                "priority": "urgent",
                "expiresAt": expires,
            }))
        };

        let AdminAction::CreateNotice { expires_at, .. } = notice("2026-03-01").unwrap() else {
            panic!("expected create_notice");
        };
        assert_eq!(
            expires_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
        );

        let AdminAction::CreateNotice { expires_at, .. } =
            notice("2026-03-01T10:30:00+05:30").unwrap()
        else {
            panic!("expected create_notice");
        };
        assert_eq!(
            expires_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 1, 5, 0, 0).unwrap())
        );

        assert!(notice("next tuesday").is_err());
    }

    #[test]
    fn test_rejects_bad_enum_values_and_missing_fields() {
        assert!(
            parse(json!({
                "action": "update_resource_status",
                "resourceId": ResourceId::random(),
                "newStatus": "archived",
            }))
            .is_err()
        );
        assert!(parse(json!({ "action": "toggle_notice", "noticeId": NoticeId::random() })).is_err());
        assert!(parse(json!({ "action": "ban_user", "email": "not-an-email" })).is_err());
    }

    #[test]
    fn test_ban_email_is_normalized() {
        let action = parse(json!({
            "action": "ban_user",
            "email": "  Spam.Bot@College.EDU ",
            "reason": "   ",
        }))
        .unwrap();
        let AdminAction::BanUser { email, reason } = action else {
            panic!("expected ban_user");
        };
        assert_eq!(email.as_str(), "spam.bot@college.edu");
        assert_eq!(reason, None);
    }

    #[test]
    fn test_validate_syllabus_subject_must_not_be_blank() {
        let upload = |subject: &str| {
            parse(json!({
                "action": "upload_syllabus",
                "semester": "5",
                "branch": "cse",
                "subject": subject,
                "title": "OS syllabus",
                "pdfUrl": "https://files.example.net/os.pdf",
            }))
            .unwrap()
        };

        assert!(upload("Operating Systems").validate().is_ok());
        assert!(upload("Quantum Computing Elective").validate().is_ok());
        assert!(upload("").validate().is_err());
        assert!(upload("   ").validate().is_err());
    }

    #[test]
    fn test_validate_create_resource_needs_matching_url() {
        let resource = |kind: &str, file: &str, video: &str| {
            parse(json!({
                "action": "create_resource",
                "title": "Lecture 4",
                "semester": "3",
                "branch": "ece",
                "subject": "VLSI",
                "type": kind,
                "fileUrl": file,
                "videoUrl": video,
            }))
            .unwrap()
        };

        assert!(resource("notes", "https://files.example.net/n.pdf", "").validate().is_ok());
        assert!(resource("notes", "", "https://video.example.net/v").validate().is_err());
        assert!(resource("video", "", "https://video.example.net/v").validate().is_ok());
        assert!(resource("video", "https://files.example.net/n.pdf", "").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_title() {
        let action = parse(json!({
            "action": "create_notice",
            "title": "  ",
            "content": "c",
            "department": "cse",
        }))
        .unwrap();
        assert_eq!(action.validate(), Err("title is required".to_owned()));
    }
}
