//! API endpoint URL builders
//!
//! `base_url` already includes the API prefix (`http://host/api`) and has
//! no trailing slash.

use scholar_common::types::{ApplicationId, DocumentId, NotificationId, ScholarshipId, StepId};
use urlencoding::encode;

pub fn login_url(base_url: &str) -> String {
    format!("{}/auth/login", base_url)
}

pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url)
}

pub fn public_scholarship_url(base_url: &str, id: &ScholarshipId) -> String {
    format!("{}/public/scholarships/{}", base_url, encode(id.as_str()))
}

pub fn applications_url(base_url: &str) -> String {
    format!("{}/applications", base_url)
}

/// The caller's own application for a scholarship
pub fn my_application_url(base_url: &str, scholarship_id: &ScholarshipId) -> String {
    format!(
        "{}/applications/my?scholarship_id={}",
        base_url,
        encode(scholarship_id.as_str())
    )
}

pub fn application_url(base_url: &str, id: &ApplicationId) -> String {
    format!("{}/applications/{}", base_url, encode(id.as_str()))
}

pub fn section_url(base_url: &str, id: &ApplicationId, step: StepId) -> String {
    format!("{}/sections/{}", application_url(base_url, id), step.slug())
}

pub fn draft_url(base_url: &str, id: &ApplicationId) -> String {
    format!("{}/draft", application_url(base_url, id))
}

pub fn submit_url(base_url: &str, id: &ApplicationId) -> String {
    format!("{}/submit", application_url(base_url, id))
}

pub fn document_upload_url(base_url: &str, id: &ApplicationId) -> String {
    format!("{}/documents/applications/{}/upload", base_url, encode(id.as_str()))
}

pub fn documents_url(base_url: &str, application_id: &ApplicationId) -> String {
    format!(
        "{}/documents?application_id={}",
        base_url,
        encode(application_id.as_str())
    )
}

pub fn document_url(base_url: &str, id: &DocumentId) -> String {
    format!("{}/documents/{}", base_url, encode(id.as_str()))
}

pub fn interview_slots_url(base_url: &str, scholarship_id: &ScholarshipId) -> String {
    format!(
        "{}/interview/slots?scholarship_id={}",
        base_url,
        encode(scholarship_id.as_str())
    )
}

pub fn interview_bookings_url(base_url: &str) -> String {
    format!("{}/interview/bookings", base_url)
}

pub fn my_interview_bookings_url(base_url: &str) -> String {
    format!("{}/interview/bookings/my", base_url)
}

pub fn notifications_url(base_url: &str) -> String {
    format!("{}/notifications", base_url)
}

pub fn unread_count_url(base_url: &str) -> String {
    format!("{}/notifications/unread-count", base_url)
}

pub fn notification_url(base_url: &str, id: &NotificationId) -> String {
    format!("{}/notifications/{}", base_url, encode(id.as_str()))
}

pub fn notification_read_url(base_url: &str, id: &NotificationId) -> String {
    format!("{}/read", notification_url(base_url, id))
}

pub fn read_all_notifications_url(base_url: &str) -> String {
    format!("{}/notifications/read-all", base_url)
}
