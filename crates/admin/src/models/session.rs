//! Session-related types for admin authentication.
//!
//! The session entry is the only client-scoped state the service keeps. It is
//! replaced wholesale on login and removed on logout or expiry.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use studyspace_core::AdminIdentity;

/// Session-stored admin identity plus its validity window.
///
/// Serialized as the identity fields followed by `logged_in_at` and
/// `expires_at` in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    #[serde(flatten)]
    pub identity: AdminIdentity,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub logged_in_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Fixed session lifetime.
    pub const TTL: TimeDelta = TimeDelta::hours(24);

    /// Start a session for `identity` at `now`.
    #[must_use]
    pub fn start(identity: AdminIdentity, now: DateTime<Utc>) -> Self {
        Self {
            identity,
            logged_in_at: now,
            expires_at: now + Self::TTL,
        }
    }

    /// A session is still valid at the exact instant it expires.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Name of the single session entry holding the [`super::AdminSession`].
    pub const ADMIN_SESSION: &str = "admin_session";
}
