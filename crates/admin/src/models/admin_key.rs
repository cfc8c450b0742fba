//! Admin key domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use studyspace_core::{AdminIdentity, AdminKeyId, AdminRole, Department, KeyHash};

/// A stored admin key record (domain type).
///
/// Only the digest of the secret is ever stored.
#[derive(Debug, Clone, Serialize)]
pub struct AdminKeyRecord {
    pub id: AdminKeyId,
    pub key_hash: KeyHash,
    pub admin_name: String,
    pub role: AdminRole,
    pub department: Option<Department>,
    pub subject: Option<String>,
    pub college_id: Option<String>,
    /// Inactive keys can neither log in nor pass relay re-authentication.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

impl AdminKeyRecord {
    /// The identity this key grants.
    #[must_use]
    pub fn identity(&self) -> AdminIdentity {
        AdminIdentity {
            id: self.id,
            key_hash: self.key_hash.clone(),
            admin_name: self.admin_name.clone(),
            role: self.role,
            department: self.department,
            subject: self.subject.clone(),
            college_id: self.college_id.clone(),
        }
    }
}

/// Fields for issuing a new admin key.
#[derive(Debug, Clone)]
pub struct NewAdminKey {
    pub key_hash: KeyHash,
    pub admin_name: String,
    pub role: AdminRole,
    pub department: Option<Department>,
    pub subject: Option<String>,
    pub college_id: Option<String>,
}
