//! In-memory [`AdminStore`] for tests and local development.
//!
//! Mirrors the Postgres semantics the relay relies on: row-level mutations
//! return the affected rows, deletes of missing rows return an empty set and
//! banned emails are unique.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use studyspace_core::{
    AdminKeyId, BannedUserId, Email, KeyHash, NoticeId, ResourceId, ResourceStatus, SyllabusId,
};

use super::{AdminStore, RepositoryError};
use crate::models::{
    AdminKeyRecord, BannedUser, NewAdminKey, NewBan, NewNotice, NewResource, NewSyllabus, Notice,
    Resource, Syllabus,
};

#[derive(Debug, Default)]
struct Tables {
    admin_keys: Vec<AdminKeyRecord>,
    resources: Vec<Resource>,
    notices: Vec<Notice>,
    syllabus: Vec<Syllabus>,
    banned_users: Vec<BannedUser>,
}

/// Data store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent mutation (including `touch_key`) fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "writes are disabled on this store".to_owned(),
            ));
        }
        Ok(())
    }

    /// Issue an active key.
    pub async fn insert_key(&self, key: NewAdminKey) -> AdminKeyRecord {
        let record = AdminKeyRecord {
            id: AdminKeyId::random(),
            key_hash: key.key_hash,
            admin_name: key.admin_name,
            role: key.role,
            department: key.department,
            subject: key.subject,
            college_id: key.college_id,
            is_active: true,
            created_at: Utc::now(),
            last_used: None,
        };
        self.tables.lock().await.admin_keys.push(record.clone());
        record
    }

    /// Flip `is_active` to false for a key.
    pub async fn deactivate_key(&self, id: AdminKeyId) {
        let mut tables = self.tables.lock().await;
        if let Some(key) = tables.admin_keys.iter_mut().find(|k| k.id == id) {
            key.is_active = false;
        }
    }

    /// Current `last_used` stamp of a key.
    pub async fn last_used(&self, id: AdminKeyId) -> Option<DateTime<Utc>> {
        self.tables
            .lock()
            .await
            .admin_keys
            .iter()
            .find(|k| k.id == id)
            .and_then(|k| k.last_used)
    }

    /// Insert a resource as a student upload would.
    pub async fn seed_resource(&self, resource: Resource) {
        self.tables.lock().await.resources.push(resource);
    }

    pub async fn seed_notice(&self, notice: Notice) {
        self.tables.lock().await.notices.push(notice);
    }

    pub async fn resources(&self) -> Vec<Resource> {
        self.tables.lock().await.resources.clone()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        self.tables.lock().await.notices.clone()
    }

    pub async fn syllabus(&self) -> Vec<Syllabus> {
        self.tables.lock().await.syllabus.clone()
    }

    pub async fn banned_users(&self) -> Vec<BannedUser> {
        self.tables.lock().await.banned_users.clone()
    }
}

/// Remove every row matching `pred`, returning the removed rows.
fn remove_where<T>(rows: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Vec<T> {
    let (removed, kept) = std::mem::take(rows).into_iter().partition(|row| pred(row));
    *rows = kept;
    removed
}

impl AdminStore for MemoryStore {
    async fn find_active_key(
        &self,
        key_hash: &KeyHash,
    ) -> Result<Option<AdminKeyRecord>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .await
            .admin_keys
            .iter()
            .find(|k| k.is_active && k.key_hash == *key_hash)
            .cloned())
    }

    async fn touch_key(&self, id: AdminKeyId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        if let Some(key) = tables.admin_keys.iter_mut().find(|k| k.id == id) {
            key.last_used = Some(at);
        }
        Ok(())
    }

    async fn update_resource_status(
        &self,
        id: ResourceId,
        status: ResourceStatus,
    ) -> Result<Vec<Resource>, RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        Ok(tables
            .resources
            .iter_mut()
            .filter(|r| r.id == id)
            .map(|r| {
                r.status = status;
                r.clone()
            })
            .collect())
    }

    async fn insert_resource(&self, resource: NewResource) -> Result<Vec<Resource>, RepositoryError> {
        self.check_writable()?;
        let row = Resource {
            id: ResourceId::random(),
            title: resource.title,
            description: resource.description,
            semester: resource.semester,
            branch: resource.branch.code().to_owned(),
            subject: resource.subject,
            chapter: resource.chapter,
            topic: resource.topic,
            resource_type: resource.resource_type,
            status: resource.status,
            source: resource.source,
            file_url: resource.file_url,
            video_url: resource.video_url,
            college_id: resource.college_id,
            uploaded_by_name: Some(resource.uploaded_by_name),
            uploaded_by_email: None,
            created_at: Utc::now(),
        };
        self.tables.lock().await.resources.push(row.clone());
        Ok(vec![row])
    }

    async fn delete_resource(&self, id: ResourceId) -> Result<Vec<Resource>, RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.resources, |r| r.id == id))
    }

    async fn insert_notice(&self, notice: NewNotice) -> Result<Vec<Notice>, RepositoryError> {
        self.check_writable()?;
        let row = Notice {
            id: NoticeId::random(),
            title: notice.title,
            content: notice.content,
            department: notice.department,
            priority: notice.priority,
            file_url: notice.file_url,
            file_type: notice.file_type,
            expires_at: notice.expires_at,
            created_by: notice.created_by,
            is_active: true,
            created_at: Utc::now(),
        };
        self.tables.lock().await.notices.push(row.clone());
        Ok(vec![row])
    }

    async fn set_notice_active(
        &self,
        id: NoticeId,
        is_active: bool,
    ) -> Result<Vec<Notice>, RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        Ok(tables
            .notices
            .iter_mut()
            .filter(|n| n.id == id)
            .map(|n| {
                n.is_active = is_active;
                n.clone()
            })
            .collect())
    }

    async fn delete_notice(&self, id: NoticeId) -> Result<Vec<Notice>, RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.notices, |n| n.id == id))
    }

    async fn insert_syllabus(&self, syllabus: NewSyllabus) -> Result<Vec<Syllabus>, RepositoryError> {
        self.check_writable()?;
        let row = Syllabus {
            id: SyllabusId::random(),
            semester: syllabus.semester,
            branch: syllabus.branch,
            subject: syllabus.subject,
            title: syllabus.title,
            pdf_url: syllabus.pdf_url,
            academic_year: syllabus.academic_year,
            uploaded_by: syllabus.uploaded_by,
            is_active: true,
            created_at: Utc::now(),
        };
        self.tables.lock().await.syllabus.push(row.clone());
        Ok(vec![row])
    }

    async fn delete_syllabus(&self, id: SyllabusId) -> Result<Vec<Syllabus>, RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.syllabus, |s| s.id == id))
    }

    async fn insert_ban(&self, ban: NewBan) -> Result<Vec<BannedUser>, RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        if tables.banned_users.iter().any(|b| b.email == ban.email) {
            return Err(RepositoryError::Conflict(format!(
                "duplicate key value violates unique constraint \"banned_users_email_key\": {}",
                ban.email
            )));
        }
        let row = BannedUser {
            id: BannedUserId::random(),
            email: ban.email,
            reason: ban.reason,
            banned_by: ban.banned_by,
            banned_at: Utc::now(),
        };
        tables.banned_users.push(row.clone());
        Ok(vec![row])
    }

    async fn delete_ban(&self, email: &Email) -> Result<Vec<BannedUser>, RepositoryError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        Ok(remove_where(&mut tables.banned_users, |b| b.email == *email))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use studyspace_core::AdminRole;

    use super::*;

    fn new_key(secret: &str) -> NewAdminKey {
        NewAdminKey {
            key_hash: KeyHash::from_secret(secret),
            admin_name: "Dr. Rao".to_owned(),
            role: AdminRole::SuperAdmin,
            department: None,
            subject: None,
            college_id: None,
        }
    }

    #[tokio::test]
    async fn test_find_active_key_ignores_inactive() {
        let store = MemoryStore::new();
        let record = store.insert_key(new_key("s3cret")).await;
        let hash = KeyHash::from_secret("s3cret");

        assert!(store.find_active_key(&hash).await.unwrap().is_some());
        store.deactivate_key(record.id).await;
        assert!(store.find_active_key(&hash).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ban_is_unique_per_email() {
        let store = MemoryStore::new();
        let ban = NewBan {
            email: Email::parse("spam@college.edu").unwrap(),
            reason: "spam".to_owned(),
            banned_by: "Dr. Rao".to_owned(),
        };
        assert_eq!(store.insert_ban(ban.clone()).await.unwrap().len(), 1);
        assert!(matches!(
            store.insert_ban(ban).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_rows_returns_empty() {
        let store = MemoryStore::new();
        assert!(
            store
                .delete_notice(NoticeId::random())
                .await
                .unwrap()
                .is_empty()
        );
        let email = Email::parse("nobody@college.edu").unwrap();
        assert!(store.delete_ban(&email).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_writes() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let result = store.delete_resource(ResourceId::random()).await;
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }
}
