//! Permission evaluator.
//!
//! Pure predicates deciding whether an admin may act on a department or
//! subject. They read nothing but the identity passed in: no clock, no
//! session, no database. The admin service calls them twice for scoped
//! actions - once to gate the UI, once inside the relay against the identity
//! it just re-fetched - and only the relay's answer is authoritative.
//!
//! Scope rules:
//! - a super admin is unrestricted;
//! - a department admin acts only within their one department;
//! - inside that department, no subject means every subject, a subject
//!   restricts to exactly that subject.

use std::collections::BTreeSet;

use crate::{AdminIdentity, AdminRole, Department, NoticeTarget};

/// Whether `identity` may post a notice to `target`.
///
/// Only super admins may post to [`NoticeTarget::All`].
#[must_use]
pub fn can_post_to_department(identity: &AdminIdentity, target: NoticeTarget) -> bool {
    match (identity.role, target) {
        (AdminRole::SuperAdmin, _) => true,
        (AdminRole::DeptAdmin, NoticeTarget::All) => false,
        (AdminRole::DeptAdmin, NoticeTarget::Department(department)) => {
            identity.department == Some(department)
        }
    }
}

/// Whether `identity` may upload a syllabus (or other subject-scoped file)
/// for `subject` in `department`.
#[must_use]
pub fn can_upload_syllabus(identity: &AdminIdentity, department: Department, subject: &str) -> bool {
    match identity.role {
        AdminRole::SuperAdmin => true,
        AdminRole::DeptAdmin => {
            if identity.department != Some(department) {
                return false;
            }
            identity
                .subject
                .as_deref()
                .is_none_or(|allowed| allowed == subject)
        }
    }
}

/// Departments `identity` may act within.
#[must_use]
pub fn allowed_departments(identity: &AdminIdentity) -> BTreeSet<Department> {
    match identity.role {
        AdminRole::SuperAdmin => Department::ALL.into_iter().collect(),
        AdminRole::DeptAdmin => identity.department.into_iter().collect(),
    }
}

/// Notice audiences `identity` may post to, `all` first when permitted.
#[must_use]
pub fn allowed_notice_targets(identity: &AdminIdentity) -> Vec<NoticeTarget> {
    let all = identity.is_super_admin().then_some(NoticeTarget::All);
    all.into_iter()
        .chain(
            allowed_departments(identity)
                .into_iter()
                .map(NoticeTarget::Department),
        )
        .collect()
}

/// Subjects of `department` that `identity` may act on, in catalog order.
#[must_use]
pub fn allowed_subjects(identity: &AdminIdentity, department: Department) -> Vec<&str> {
    let full_catalog = || department.subjects().to_vec();

    match identity.role {
        AdminRole::SuperAdmin => full_catalog(),
        AdminRole::DeptAdmin if identity.department != Some(department) => Vec::new(),
        AdminRole::DeptAdmin => match identity.subject.as_deref() {
            None => full_catalog(),
            Some(subject) => vec![subject],
        },
    }
}
