//! Scope rules checked across the whole department and subject catalog.

use studyspace_core::permissions::{
    allowed_departments, allowed_notice_targets, allowed_subjects, can_post_to_department,
    can_upload_syllabus,
};
use studyspace_core::{AdminIdentity, AdminKeyId, AdminRole, Department, KeyHash, NoticeTarget};

fn identity(role: AdminRole, department: Option<Department>, subject: Option<&str>) -> AdminIdentity {
    AdminIdentity {
        id: AdminKeyId::random(),
        key_hash: KeyHash::from_secret("perm"),
        admin_name: "Scope Check".to_owned(),
        role,
        department,
        subject: subject.map(str::to_owned),
        college_id: None,
    }
}

fn every_identity() -> Vec<AdminIdentity> {
    let mut identities = vec![identity(AdminRole::SuperAdmin, None, None)];
    for department in Department::ALL {
        identities.push(identity(AdminRole::DeptAdmin, Some(department), None));
        for &subject in department.subjects() {
            identities.push(identity(AdminRole::DeptAdmin, Some(department), Some(subject)));
        }
    }
    identities
}

#[test]
fn test_super_admin_is_unrestricted() {
    let admin = identity(AdminRole::SuperAdmin, None, None);

    assert!(can_post_to_department(&admin, NoticeTarget::All));
    for department in Department::ALL {
        assert!(can_post_to_department(&admin, NoticeTarget::Department(department)));
        for subject in department.subjects() {
            assert!(can_upload_syllabus(&admin, department, subject));
        }
    }
    assert_eq!(allowed_notice_targets(&admin).len(), Department::ALL.len() + 1);
}

#[test]
fn test_only_super_admin_posts_to_all() {
    for admin in every_identity() {
        assert_eq!(
            can_post_to_department(&admin, NoticeTarget::All),
            admin.is_super_admin()
        );
    }
}

#[test]
fn test_dept_admin_never_leaves_department() {
    for admin in every_identity().into_iter().filter(|a| !a.is_super_admin()) {
        let home = admin.department.unwrap_or(Department::Cse);
        for department in Department::ALL.into_iter().filter(|&d| d != home) {
            assert!(!can_post_to_department(&admin, NoticeTarget::Department(department)));
            for subject in department.subjects() {
                assert!(!can_upload_syllabus(&admin, department, subject));
            }
            assert!(allowed_subjects(&admin, department).is_empty());
        }
        assert_eq!(allowed_departments(&admin).into_iter().collect::<Vec<_>>(), [home]);
    }
}

#[test]
fn test_subject_restriction_is_exact() {
    for department in Department::ALL {
        for &restricted in department.subjects() {
            let admin = identity(AdminRole::DeptAdmin, Some(department), Some(restricted));
            for &subject in department.subjects() {
                assert_eq!(
                    can_upload_syllabus(&admin, department, subject),
                    subject == restricted
                );
            }
            assert_eq!(allowed_subjects(&admin, department), [restricted]);
        }
    }
}

#[test]
fn test_ui_gate_agrees_with_relay_check() {
    for admin in every_identity() {
        let targets = allowed_notice_targets(&admin);
        for department in Department::ALL {
            let target = NoticeTarget::Department(department);
            assert_eq!(targets.contains(&target), can_post_to_department(&admin, target));

            let offered = allowed_subjects(&admin, department);
            for subject in department.subjects() {
                assert_eq!(
                    offered.contains(subject),
                    can_upload_syllabus(&admin, department, subject)
                );
            }
        }
    }
}
