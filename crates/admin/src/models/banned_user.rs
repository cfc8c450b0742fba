//! Banned user domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use studyspace_core::{BannedUserId, Email};

/// Reason recorded when the moderator leaves the field blank.
pub const DEFAULT_BAN_REASON: &str = "No reason provided";

/// A banned student account, keyed by email.
#[derive(Debug, Clone, Serialize)]
pub struct BannedUser {
    pub id: BannedUserId,
    pub email: Email,
    pub reason: String,
    pub banned_by: String,
    pub banned_at: DateTime<Utc>,
}

/// Fields for a new ban.
#[derive(Debug, Clone)]
pub struct NewBan {
    pub email: Email,
    pub reason: String,
    pub banned_by: String,
}
