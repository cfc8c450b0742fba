//! Admin session store.
//!
//! Login hashes the submitted secret, matches it against an active
//! `admin_keys` row and writes a single [`AdminSession`] entry into the
//! tower session. The entry is replaced wholesale on login and checked for
//! expiry lazily on every read.

mod error;

pub use error::AuthError;

use chrono::{DateTime, Utc};
use tower_sessions::Session;

use studyspace_core::KeyHash;

use crate::db::AdminStore;
use crate::models::{AdminSession, session_keys};

/// Session store scoped to one request's tower session.
pub struct AdminSessionStore<'a> {
    session: &'a Session,
}

impl<'a> AdminSessionStore<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Log in with a plaintext admin secret.
    ///
    /// Updating the key's `last_used` stamp is best-effort: a failure is
    /// logged and the login still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if no active key matches.
    /// Returns `AuthError::Repository` if the key lookup fails.
    /// Returns `AuthError::Session` if the session cannot be written.
    pub async fn login<S: AdminStore>(
        &self,
        store: &S,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, AuthError> {
        let secret = secret.trim();
        if secret.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let key_hash = KeyHash::from_secret(secret);
        let record = store
            .find_active_key(&key_hash)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if let Err(e) = store.touch_key(record.id, now).await {
            tracing::warn!(admin_key_id = %record.id, error = %e, "Failed to update key last_used");
        }

        let admin = AdminSession::start(record.identity(), now);

        // New session id on privilege change
        self.session.cycle_id().await?;
        self.session
            .insert(session_keys::ADMIN_SESSION, &admin)
            .await?;

        tracing::info!(
            admin_name = %admin.identity.admin_name,
            role = %admin.identity.role,
            "Admin logged in"
        );

        Ok(admin)
    }

    /// The stored session, unless it has expired or cannot be parsed.
    ///
    /// Expired and unparseable entries are removed before returning `None`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session backend fails.
    pub async fn current(&self, now: DateTime<Utc>) -> Result<Option<AdminSession>, AuthError> {
        let Some(value) = self.session.get_value(session_keys::ADMIN_SESSION).await? else {
            return Ok(None);
        };

        match serde_json::from_value::<AdminSession>(value) {
            Ok(admin) if !admin.is_expired(now) => Ok(Some(admin)),
            Ok(_) => {
                tracing::debug!("Admin session expired");
                self.clear().await?;
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable admin session");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    /// Remove the stored session, whether or not one exists.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session backend fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.clear().await?;
        self.session.flush().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AuthError> {
        self.session
            .remove_value(session_keys::ADMIN_SESSION)
            .await?;
        Ok(())
    }
}
