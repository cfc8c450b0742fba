//! Moderation flows through the relay against the in-memory store.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use serde_json::{Value, json};

use studyspace_admin::db::MemoryStore;
use studyspace_admin::models::Resource;
use studyspace_admin::services::relay::{ActionKind, Relay, RelayError, TEACHER_UPLOADER};
use studyspace_core::{AdminRole, Department, ResourceId, ResourceStatus, ResourceType};
use studyspace_integration_tests::{issue_key, key_hash};

const SUPER: &str = "7f3c1e9a-super";
const CSE: &str = "2b8d4f60-cse";
const OS_TEACHER: &str = "c41a77e2-os";

async fn campus() -> MemoryStore {
    let store = MemoryStore::new();
    issue_key(&store, SUPER, "Exam Cell", AdminRole::SuperAdmin, None, None).await;
    issue_key(
        &store,
        CSE,
        "CSE Coordinator",
        AdminRole::DeptAdmin,
        Some(Department::Cse),
        None,
    )
    .await;
    issue_key(
        &store,
        OS_TEACHER,
        "Prof. Nair",
        AdminRole::DeptAdmin,
        Some(Department::Cse),
        Some("Operating Systems"),
    )
    .await;
    store
}

fn call(secret: &str, action: &str, payload: Value) -> Value {
    let mut body = payload;
    body["action"] = json!(action);
    body["keyHash"] = json!(key_hash(secret));
    body
}

fn student_upload(title: &str) -> Resource {
    Resource {
        id: ResourceId::random(),
        title: title.to_owned(),
        description: None,
        semester: "4".to_owned(),
        branch: "cse".to_owned(),
        subject: "DBMS".to_owned(),
        chapter: Some("Normalization".to_owned()),
        topic: None,
        resource_type: ResourceType::Notes,
        status: ResourceStatus::Pending,
        source: "student".to_owned(),
        file_url: Some("https://files.example.net/raw/dbms.pdf".to_owned()),
        video_url: None,
        college_id: Some("gec-thrissur".to_owned()),
        uploaded_by_name: Some("Anu".to_owned()),
        uploaded_by_email: Some("anu@student.example.edu".to_owned()),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_resource_moderation_flow() {
    let store = campus().await;
    let relay = Relay::new(&store);
    let resource = student_upload("DBMS unit 3 notes");
    let id = resource.id.to_string();
    store.seed_resource(resource).await;

    let approved = relay
        .handle(call(
            CSE,
            "update_resource_status",
            json!({ "resourceId": id, "newStatus": "approved" }),
        ))
        .await
        .unwrap();
    assert_eq!(approved.kind, ActionKind::UpdateResourceStatus);
    assert_eq!(approved.data[0]["status"], "approved");

    let rejected = relay
        .handle(call(
            SUPER,
            "update_resource_status",
            json!({ "resourceId": id, "newStatus": "rejected" }),
        ))
        .await
        .unwrap();
    assert_eq!(rejected.data[0]["status"], "rejected");
    assert_eq!(store.resources().await[0].status, ResourceStatus::Rejected);

    let deleted = relay
        .handle(call(CSE, "delete_resource", json!({ "resourceId": id })))
        .await
        .unwrap();
    assert_eq!(deleted.data.as_array().map(Vec::len), Some(1));
    assert!(store.resources().await.is_empty());

    // A second delete affects nothing but still succeeds
    let again = relay
        .handle(call(CSE, "delete_resource", json!({ "resourceId": id })))
        .await
        .unwrap();
    assert_eq!(again.data, json!([]));
}

#[tokio::test]
async fn test_invalid_status_is_rejected_before_write() {
    let store = campus().await;
    let resource = student_upload("Pending notes");
    let id = resource.id.to_string();
    store.seed_resource(resource).await;

    let result = Relay::new(&store)
        .handle(call(
            SUPER,
            "update_resource_status",
            json!({ "resourceId": id, "newStatus": "published" }),
        ))
        .await;

    assert!(matches!(result, Err(RelayError::Validation(_))));
    assert_eq!(store.resources().await[0].status, ResourceStatus::Pending);
}

#[tokio::test]
async fn test_teacher_resource_is_published_immediately() {
    let store = campus().await;
    let relay = Relay::new(&store);

    let outcome = relay
        .handle(call(
            OS_TEACHER,
            "create_resource",
            json!({
                "title": "Deadlock slides",
                "semester": "5",
                "branch": "cse",
                "subject": "Operating Systems",
                "type": "notes",
                "fileUrl": "https://files.example.net/os/deadlock.pdf",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(outcome.data[0]["status"], "approved");
    assert_eq!(outcome.data[0]["source"], "teacher");
    assert_eq!(outcome.data[0]["uploaded_by_name"], TEACHER_UPLOADER);
    assert_eq!(outcome.data[0]["college_id"], "gec-thrissur");

    let outside_subject = relay
        .handle(call(
            OS_TEACHER,
            "create_resource",
            json!({
                "title": "ER diagrams",
                "semester": "4",
                "branch": "cse",
                "subject": "DBMS",
                "type": "notes",
                "fileUrl": "https://files.example.net/dbms/er.pdf",
            }),
        ))
        .await;
    assert!(matches!(outside_subject, Err(RelayError::PermissionDenied("subject"))));
    assert_eq!(store.resources().await.len(), 1);
}

#[tokio::test]
async fn test_notice_lifecycle_reports_orphaned_pdf() {
    let store = campus().await;
    let relay = Relay::new(&store);

    let created = relay
        .handle(call(
            SUPER,
            "create_notice",
            json!({
                "title": "Exam timetable",
                "content": "Semester exams begin 2 December.",
                "department": "all",
                "priority": "urgent",
                "fileUrl": "https://project.example.net/storage/v1/object/public/resources/notices/timetable.pdf",
                "fileType": "pdf",
                "expiresAt": "2026-12-20",
            }),
        ))
        .await
        .unwrap();
    let notice_id = created.data[0]["id"].as_str().unwrap().to_owned();
    assert_eq!(created.data[0]["created_by"], "Exam Cell");
    assert!(created.orphaned_file.is_none());

    let hidden = relay
        .handle(call(
            CSE,
            "toggle_notice",
            json!({ "noticeId": notice_id, "isActive": false }),
        ))
        .await
        .unwrap();
    assert_eq!(hidden.data[0]["is_active"], false);

    let deleted = relay
        .handle(call(SUPER, "delete_notice", json!({ "noticeId": notice_id })))
        .await
        .unwrap();
    assert_eq!(
        deleted.orphaned_file.as_deref(),
        Some("https://project.example.net/storage/v1/object/public/resources/notices/timetable.pdf")
    );
    assert!(store.notices().await.is_empty());
}

#[tokio::test]
async fn test_video_notice_leaves_no_orphan() {
    let store = campus().await;
    let relay = Relay::new(&store);

    let created = relay
        .handle(call(
            CSE,
            "create_notice",
            json!({
                "title": "Lab walkthrough",
                "content": "Recorded demo of the new lab setup.",
                "department": "cse",
                "fileUrl": "https://video.example.net/watch?v=lab",
                "fileType": "video",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(created.data[0]["priority"], "normal");

    let notice_id = created.data[0]["id"].as_str().unwrap().to_owned();
    let deleted = relay
        .handle(call(CSE, "delete_notice", json!({ "noticeId": notice_id })))
        .await
        .unwrap();
    assert!(deleted.orphaned_file.is_none());
}

#[tokio::test]
async fn test_syllabus_upload_and_delete() {
    let store = campus().await;
    let relay = Relay::new(&store);

    let uploaded = relay
        .handle(call(
            OS_TEACHER,
            "upload_syllabus",
            json!({
                "semester": "5",
                "branch": "cse",
                "subject": "Operating Systems",
                "title": "OS syllabus",
                "pdfUrl": "https://files.example.net/syllabus/os.pdf",
                "academicYear": "2025-26",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(uploaded.data[0]["uploaded_by"], "Prof. Nair");
    assert_eq!(uploaded.data[0]["academic_year"], "2025-26");

    let wrong_branch = relay
        .handle(call(
            CSE,
            "upload_syllabus",
            json!({
                "semester": "5",
                "branch": "ece",
                "subject": "Signals and Systems",
                "title": "Signals syllabus",
                "pdfUrl": "https://files.example.net/syllabus/signals.pdf",
            }),
        ))
        .await;
    assert!(matches!(wrong_branch, Err(RelayError::PermissionDenied("subject"))));

    let id = uploaded.data[0]["id"].as_str().unwrap().to_owned();
    relay
        .handle(call(SUPER, "delete_syllabus", json!({ "syllabusId": id })))
        .await
        .unwrap();
    assert!(store.syllabus().await.is_empty());
}

#[tokio::test]
async fn test_ban_and_unban() {
    let store = campus().await;
    let relay = Relay::new(&store);

    let banned = relay
        .handle(call(
            CSE,
            "ban_user",
            json!({ "email": "spammer@student.example.edu", "reason": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(banned.data[0]["reason"], "No reason provided");
    assert_eq!(banned.data[0]["banned_by"], "CSE Coordinator");

    let duplicate = relay
        .handle(call(
            SUPER,
            "ban_user",
            json!({ "email": "spammer@student.example.edu", "reason": "Repeat" }),
        ))
        .await
        .unwrap_err();
    assert!(matches!(duplicate, RelayError::Conflict(ref message) if message.contains("spammer@student.example.edu")));
    assert_eq!(duplicate.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(store.banned_users().await.len(), 1);

    relay
        .handle(call(
            SUPER,
            "unban_user",
            json!({ "email": "spammer@student.example.edu" }),
        ))
        .await
        .unwrap();
    assert!(store.banned_users().await.is_empty());
}

#[tokio::test]
async fn test_revoked_key_loses_access_immediately() {
    let store = MemoryStore::new();
    let record = issue_key(&store, CSE, "CSE Coordinator", AdminRole::DeptAdmin, Some(Department::Cse), None).await;
    let relay = Relay::new(&store);
    let ban = || call(CSE, "ban_user", json!({ "email": "x@student.example.edu" }));

    assert!(relay.handle(ban()).await.is_ok());

    store.deactivate_key(record.id).await;
    assert!(matches!(relay.handle(ban()).await, Err(RelayError::Unauthorized)));
}

#[tokio::test]
async fn test_store_failure_surfaces_as_internal() {
    let store = campus().await;
    store.set_fail_writes(true);

    let err = Relay::new(&store)
        .handle(call(SUPER, "ban_user", json!({ "email": "x@student.example.edu" })))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Internal(ref message) if message.contains("unavailable")));
    assert_eq!(err.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_every_action_tag_is_recognized() {
    let store = campus().await;
    let relay = Relay::new(&store);

    for kind in ActionKind::ALL {
        // An empty payload fails validation, never the tag lookup
        let result = relay.handle(call(SUPER, kind.tag(), json!({}))).await;
        assert!(
            matches!(result, Err(RelayError::Validation(_))),
            "{kind} was not recognized: {result:?}"
        );
    }
}
