//! Privileged-mutation relay.
//!
//! Every call is authorized from scratch:
//!
//! 1. read the `{action, keyHash}` envelope,
//! 2. re-authenticate `keyHash` against the active admin keys,
//! 3. decode and validate the typed [`AdminAction`],
//! 4. re-apply the scope rules to the freshly loaded identity,
//! 5. run exactly one data-store mutation.
//!
//! Client-side session state is never trusted here.

mod action;
mod error;

pub use action::{ActionKind, AdminAction};
pub use error::RelayError;

use serde::Serialize;
use serde_json::Value;

use studyspace_core::permissions::{can_post_to_department, can_upload_syllabus};
use studyspace_core::{AdminIdentity, KeyHash, ResourceStatus};

use crate::db::AdminStore;
use crate::models::{DEFAULT_BAN_REASON, NewBan, NewNotice, NewResource, NewSyllabus};

/// Uploader name recorded on resources created through the relay.
pub const TEACHER_UPLOADER: &str = "Teacher/Admin";

/// Result of a successful relay call.
#[derive(Debug)]
pub struct RelayOutcome {
    pub kind: ActionKind,
    /// Affected rows, serialized.
    pub data: Value,
    /// Stored file left behind by a deleted record, to be removed best-effort.
    pub orphaned_file: Option<String>,
}

/// The relay, bound to a data store.
pub struct Relay<'a, S> {
    store: &'a S,
}

impl<'a, S: AdminStore> Relay<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Authenticate, authorize and dispatch one relay request body.
    ///
    /// # Errors
    ///
    /// See [`RelayError`] for the full taxonomy. A bad key is always
    /// `Unauthorized`, whatever the action or payload.
    pub async fn handle(&self, body: Value) -> Result<RelayOutcome, RelayError> {
        let (tag, key_hash) = envelope(&body).ok_or(RelayError::MissingEnvelope)?;
        let identity = self.authenticate(key_hash).await?;

        let kind = ActionKind::from_tag(tag).ok_or_else(|| RelayError::InvalidAction(tag.to_owned()))?;
        let action: AdminAction =
            serde_json::from_value(body).map_err(|e| RelayError::Validation(e.to_string()))?;
        action.validate().map_err(RelayError::Validation)?;

        let outcome = match authorize(&identity, &action) {
            Ok(()) => self.dispatch(&identity, action).await,
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(_) => tracing::info!(action = %kind, admin_name = %identity.admin_name, "Relay action applied"),
            Err(e) => tracing::warn!(action = %kind, admin_name = %identity.admin_name, error = %e, "Relay action failed"),
        }

        outcome
    }

    async fn authenticate(&self, key_hash: &str) -> Result<AdminIdentity, RelayError> {
        let key_hash = KeyHash::from_hex(key_hash.to_owned());
        if !key_hash.is_well_formed() {
            return Err(RelayError::Unauthorized);
        }

        self.store
            .find_active_key(&key_hash)
            .await?
            .map(|record| record.identity())
            .ok_or(RelayError::Unauthorized)
    }

    async fn dispatch(
        &self,
        identity: &AdminIdentity,
        action: AdminAction,
    ) -> Result<RelayOutcome, RelayError> {
        let kind = action.kind();
        let mut orphaned_file = None;

        let data = match action {
            AdminAction::UpdateResourceStatus {
                resource_id,
                new_status,
            } => to_data(
                self.store
                    .update_resource_status(resource_id, new_status)
                    .await?,
            ),
            AdminAction::DeleteResource { resource_id } => {
                to_data(self.store.delete_resource(resource_id).await?)
            }
            AdminAction::CreateResource {
                title,
                semester,
                branch,
                subject,
                resource_type,
                file_url,
                video_url,
                description,
                chapter,
                topic,
            } => to_data(
                self.store
                    .insert_resource(NewResource {
                        title,
                        description,
                        semester,
                        branch,
                        subject,
                        chapter,
                        topic,
                        resource_type,
                        status: ResourceStatus::Approved,
                        source: "teacher".to_owned(),
                        file_url,
                        video_url,
                        college_id: identity.college_id.clone(),
                        uploaded_by_name: TEACHER_UPLOADER.to_owned(),
                    })
                    .await?,
            ),
            AdminAction::CreateNotice {
                title,
                content,
                department,
                priority,
                file_url,
                file_type,
                expires_at,
            } => to_data(
                self.store
                    .insert_notice(NewNotice {
                        title,
                        content,
                        department,
                        priority,
                        file_url,
                        file_type,
                        expires_at,
                        created_by: identity.admin_name.clone(),
                    })
                    .await?,
            ),
            AdminAction::ToggleNotice {
                notice_id,
                is_active,
            } => to_data(self.store.set_notice_active(notice_id, is_active).await?),
            AdminAction::DeleteNotice { notice_id } => {
                let deleted = self.store.delete_notice(notice_id).await?;
                orphaned_file = deleted
                    .iter()
                    .find_map(|notice| notice.stored_file())
                    .map(str::to_owned);
                to_data(deleted)
            }
            AdminAction::UploadSyllabus {
                semester,
                branch,
                subject,
                title,
                pdf_url,
                academic_year,
            } => to_data(
                self.store
                    .insert_syllabus(NewSyllabus {
                        semester,
                        branch,
                        subject,
                        title,
                        pdf_url,
                        academic_year,
                        uploaded_by: identity.admin_name.clone(),
                    })
                    .await?,
            ),
            AdminAction::DeleteSyllabus { syllabus_id } => {
                to_data(self.store.delete_syllabus(syllabus_id).await?)
            }
            AdminAction::BanUser { email, reason } => to_data(
                self.store
                    .insert_ban(NewBan {
                        email,
                        reason: reason.unwrap_or_else(|| DEFAULT_BAN_REASON.to_owned()),
                        banned_by: identity.admin_name.clone(),
                    })
                    .await?,
            ),
            AdminAction::UnbanUser { email } => to_data(self.store.delete_ban(&email).await?),
        }?;

        Ok(RelayOutcome {
            kind,
            data,
            orphaned_file,
        })
    }
}

/// Scope check against the identity loaded for this call.
///
/// Only scoped actions are checked; moderation, deletes and bans are open
/// to any authenticated admin.
fn authorize(identity: &AdminIdentity, action: &AdminAction) -> Result<(), RelayError> {
    match action {
        AdminAction::CreateNotice { department, .. } => {
            if can_post_to_department(identity, *department) {
                Ok(())
            } else {
                Err(RelayError::PermissionDenied("department"))
            }
        }
        AdminAction::UploadSyllabus {
            branch, subject, ..
        } => {
            if !can_upload_syllabus(identity, *branch, subject) {
                return Err(RelayError::PermissionDenied("subject"));
            }
            // A subject-scoped key names its own subject; everyone else picks
            // from the catalog.
            if identity.subject.is_none() {
                branch
                    .require_subject(subject)
                    .map_err(|e| RelayError::Validation(e.to_string()))?;
            }
            Ok(())
        }
        AdminAction::CreateResource {
            branch, subject, ..
        } => {
            if can_upload_syllabus(identity, *branch, subject) {
                Ok(())
            } else {
                Err(RelayError::PermissionDenied("subject"))
            }
        }
        AdminAction::UpdateResourceStatus { .. }
        | AdminAction::DeleteResource { .. }
        | AdminAction::ToggleNotice { .. }
        | AdminAction::DeleteNotice { .. }
        | AdminAction::DeleteSyllabus { .. }
        | AdminAction::BanUser { .. }
        | AdminAction::UnbanUser { .. } => Ok(()),
    }
}

/// The `action` and `keyHash` strings, if both are present and non-empty.
fn envelope(body: &Value) -> Option<(&str, &str)> {
    let non_empty = |field: &str| {
        body.get(field)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    };
    Some((non_empty("action")?, non_empty("keyHash")?))
}

fn to_data<T: Serialize>(rows: Vec<T>) -> Result<Value, RelayError> {
    serde_json::to_value(rows).map_err(|e| RelayError::Internal(e.to_string()))
}
