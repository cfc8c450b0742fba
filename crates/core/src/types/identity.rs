//! Authenticated admin identity.

use serde::{Deserialize, Serialize};

use super::{AdminKeyId, AdminRole, Department, KeyHash};

/// Identity issued when a secret key matches an active key record.
///
/// Immutable for the lifetime of a session. Field names are the wire names of
/// the persisted session entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// Key record ID.
    pub id: AdminKeyId,
    /// Digest of the secret key, sent back to the relay on every mutation.
    pub key_hash: KeyHash,
    /// Display name recorded as author on notices, syllabus and bans.
    pub admin_name: String,
    pub role: AdminRole,
    /// Department scope. Unused for super admins.
    pub department: Option<Department>,
    /// Subject scope inside the department. `None` means every subject.
    pub subject: Option<String>,
    /// College the admin moderates; `None` or `all` means every college.
    pub college_id: Option<String>,
}

impl AdminIdentity {
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    /// College filter to apply to resource reads, if any.
    #[must_use]
    pub fn college_scope(&self) -> Option<&str> {
        self.college_id
            .as_deref()
            .filter(|college| !college.is_empty() && *college != "all")
    }
}
