//! End-to-end tests for the application wizard against a mock backend
//!
//! These tests drive the library the way the commands do:
//! - Section saves with validation in front of the network
//! - Central 401 handling and the login redirect
//! - Document uploads, replacement and local rejection
//! - The submission gate
//! - Notification polling

use scholar_cli::documents::{DocumentError, DocumentUploader, UploadFile};
use scholar_cli::notifications::NotificationPoller;
use scholar_cli::review::Consents;
use scholar_cli::session::{SessionUser, EXPIRED_REDIRECT};
use scholar_cli::{ApiClient, CliError, Session, SessionHandle, WizardController};
use scholar_common::sections::{FinancialInfo, PersonalInfo};
use scholar_common::types::{ApplicationId, DocumentKind, Role, StepId, MIB};
use scholar_common::{ApplicationStatus, SectionData};
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn student() -> SessionUser {
    SessionUser {
        id: "u-1".into(),
        email: "somsri@example.ac.th".to_string(),
        role: Role::Student,
        name: Some("Somsri Jaidee".to_string()),
    }
}

/// Signed-in session persisted under `dir`
fn signed_in(dir: &TempDir) -> SessionHandle {
    let mut session = Session::load(dir.path().join("session.json")).unwrap();
    session.sign_in("jwt-token".to_string(), student());
    session.save().unwrap();
    SessionHandle::new(session)
}

fn client(server: &MockServer, session: SessionHandle) -> ApiClient {
    ApiClient::new(format!("{}/api", server.uri()), session).unwrap()
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": data}))
}

fn draft_json(completed: &[u8]) -> serde_json::Value {
    json!({
        "id": 17,
        "scholarship_id": "sch-1",
        "status": "draft",
        "completed_steps": completed,
        "sections": []
    })
}

fn uploaded(id: &str, kind: &str) -> serde_json::Value {
    json!({
        "id": id,
        "document_type": kind,
        "original_name": format!("{}.pdf", kind),
        "file_size": 2048,
        "uploaded_at": "2026-10-01T08:00:00Z"
    })
}

fn all_required_documents() -> serde_json::Value {
    json!([
        uploaded("d1", "id_card"),
        uploaded("d2", "house_registration"),
        uploaded("d3", "transcript"),
        uploaded("d4", "income_certificate"),
        uploaded("d5", "photo")
    ])
}

async fn mount_draft(server: &MockServer, completed: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/api/applications/17"))
        .respond_with(ok(draft_json(completed)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_invalid_section_is_not_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_draft(&server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/applications/17/sections/personal-info"))
        .respond_with(ok(json!(null)))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/applications/17/sections/financial"))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, signed_in(&dir));
    let mut wizard = WizardController::resume(client, &ApplicationId::new("17")).await.unwrap();
    assert_eq!(wizard.current_step(), StepId::PersonalInfo);

    let mut personal = PersonalInfo::default();
    personal.first_name = "Somsri".to_string();
    let err = wizard.save_step(SectionData::PersonalInfo(personal)).await.unwrap_err();
    match err {
        CliError::Validation(errors) => {
            assert_eq!(errors.get("last_name"), Some("This field is required"));
            assert_eq!(errors.get("citizen_id"), Some("This field is required"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let mut financial = FinancialInfo::new(20_000.0, 4);
    financial.income_source = "salary".to_string();
    wizard.save_step(SectionData::Financial(financial)).await.unwrap();
    assert!(wizard.is_complete(StepId::Financial));
    assert!(!wizard.is_complete(StepId::PersonalInfo));
}

#[tokio::test]
async fn test_backend_error_keeps_step_incomplete() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_draft(&server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/applications/17/sections/financial"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"success": false, "error": "database unavailable"})),
        )
        .mount(&server)
        .await;

    let client = client(&server, signed_in(&dir));
    let mut wizard = WizardController::resume(client, &ApplicationId::new("17")).await.unwrap();

    let mut financial = FinancialInfo::new(20_000.0, 4);
    financial.income_source = "salary".to_string();
    let err = wizard.save_step(SectionData::Financial(financial)).await.unwrap_err();

    assert!(err.to_string().contains("database unavailable"));
    assert!(!wizard.is_complete(StepId::Financial));
}

#[tokio::test]
async fn test_unauthorized_expires_session_and_redirects() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/applications/17"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false, "error": "token expired"})))
        .mount(&server)
        .await;

    let session = signed_in(&dir);
    session.lock().navigate("/student/applications/17/financial");
    let client = client(&server, session.clone());

    let err = client.get_application(&ApplicationId::new("17")).await.unwrap_err();
    match err {
        CliError::SessionExpired { redirect } => {
            assert_eq!(redirect.as_deref(), Some(EXPIRED_REDIRECT));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert!(!session.lock().is_authenticated());
    let stored = Session::load(dir.path().join("session.json")).unwrap();
    assert!(stored.token.is_none());
    assert!(stored.user.is_none());
    assert_eq!(stored.current_path, EXPIRED_REDIRECT);
}

#[tokio::test]
async fn test_unauthorized_on_public_page_does_not_redirect() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/public/scholarships/sch-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let session = signed_in(&dir);
    session.lock().navigate("/scholarships/sch-1");
    let client = client(&server, session.clone());

    let err = client.get_scholarship(&"sch-1".into()).await.unwrap_err();
    assert!(matches!(err, CliError::SessionExpired { redirect: None }));
    assert!(!session.lock().is_authenticated());
    assert_eq!(session.lock().current_path, "/scholarships/sch-1");
}

#[tokio::test]
async fn test_bad_login_does_not_touch_session() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"success": false, "error": "bad credentials"})))
        .mount(&server)
        .await;

    let session = signed_in(&dir);
    let client = client(&server, session.clone());

    let err = client.login("somsri@example.ac.th", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Login failed: invalid email or password");
    assert!(session.lock().is_authenticated());
}

#[tokio::test]
async fn test_oversized_document_rejected_without_request() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let client = client(&server, signed_in(&dir));

    let mut uploader = DocumentUploader::new(ApplicationId::new("17"));
    let file = UploadFile::new("id.pdf", vec![0u8; (11 * MIB) as usize]);
    let err = uploader.upload(DocumentKind::IdCard, file, &client).await.unwrap_err();

    assert!(matches!(err, CliError::Document(DocumentError::TooLarge { .. })));
    assert!(!uploader.record(DocumentKind::IdCard).unwrap().is_uploaded());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replacing_document_uploads_then_deletes_old() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .and(query_param("application_id", "17"))
        .respond_with(ok(json!([uploaded("d-old", "transcript")])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents/applications/17/upload"))
        .respond_with(ok(uploaded("d-new", "transcript")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/d-old"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, signed_in(&dir));
    let mut uploader = DocumentUploader::new(ApplicationId::new("17"));
    uploader.refresh(&client).await.unwrap();
    assert!(uploader.record(DocumentKind::Transcript).unwrap().is_uploaded());

    let pending = uploader
        .begin_upload(DocumentKind::Transcript, UploadFile::new("grades.pdf", vec![7u8; 300 * 1024]))
        .unwrap();
    let progress = pending.progress();
    let outcome = pending.send(&client).await;
    uploader.finish(outcome, &client).await.unwrap();

    assert_eq!(*progress.borrow(), 100);
    let record = uploader.record(DocumentKind::Transcript).unwrap();
    assert_eq!(record.remote_id.as_ref().unwrap().as_str(), "d-new");

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|request| request.method.as_str() == "POST")
        .unwrap();
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"document_type\""));
    assert!(body.contains("transcript"));
    assert!(body.contains("filename=\"grades.pdf\""));
    assert_eq!(
        upload.headers.get("authorization").unwrap().to_str().unwrap(),
        "Bearer jwt-token"
    );
}

#[tokio::test]
async fn test_submission_requires_consents() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_draft(&server, &[1, 2, 3, 4, 5, 6, 7]).await;

    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ok(all_required_documents()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/applications/17/submit"))
        .respond_with(ok(json!({
            "application_id": 17,
            "status": "submitted",
            "submitted_at": "2026-10-18T09:30:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, signed_in(&dir));
    let mut wizard = WizardController::resume(client.clone(), &ApplicationId::new("17"))
        .await
        .unwrap();
    let mut uploader = DocumentUploader::new(ApplicationId::new("17"));
    uploader.refresh(&client).await.unwrap();
    assert_eq!(uploader.completion_percent(), 100);

    let only_accuracy = Consents {
        information_accurate: true,
        terms_accepted: false,
    };
    let err = wizard.submit(&uploader, only_accuracy).await.unwrap_err();
    assert!(matches!(err, CliError::SubmissionBlocked(_)));
    assert!(!wizard.is_locked());

    let receipt = wizard.submit(&uploader, Consents::accepted()).await.unwrap();
    assert_eq!(receipt.status, ApplicationStatus::Submitted);
    assert!(wizard.is_locked());
    assert_eq!(wizard.draft().status, ApplicationStatus::Submitted);
}

#[tokio::test]
async fn test_notification_poll_through_client() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/notifications/unread-count"))
        .respond_with(ok(json!({"unread_count": 1})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/notifications"))
        .respond_with(ok(json!([
            {
                "id": 9,
                "title": "Interview scheduled",
                "message": "Your interview is on 2 November",
                "type": "interview",
                "is_read": false,
                "created_at": "2026-10-17T10:00:00Z"
            },
            {
                "id": 8,
                "title": "Application received",
                "is_read": true,
                "created_at": "2026-10-10T10:00:00Z"
            }
        ])))
        .expect(2)
        .mount(&server)
        .await;

    let mut poller = NotificationPoller::new(client(&server, signed_in(&dir)));

    let update = poller.poll_once().await.unwrap();
    assert_eq!(update.unread, 1);
    assert_eq!(update.new.len(), 1);
    assert_eq!(update.new[0].title, "Interview scheduled");
    assert_eq!(update.new[0].notification_type.as_deref(), Some("interview"));

    let update = poller.poll_once().await.unwrap();
    assert!(update.new.is_empty());
}
