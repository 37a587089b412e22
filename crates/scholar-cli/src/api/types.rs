//! API request and response types
//!
//! Matches the backend API structure. Every response body is wrapped as
//! `{success, data, error}`.

use crate::error::{CliError, Result};
use crate::session::SessionUser;
use chrono::{DateTime, Utc};
use scholar_common::types::{
    ApplicationId, ApplicationStatus, BookingId, DocumentId, DocumentKind, DocumentRequirement,
    NotificationId, Role, ScholarshipId, SlotId, UserId,
};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    fn failure(&mut self, action: &str) -> CliError {
        let detail = self
            .error
            .take()
            .or_else(|| self.message.take())
            .unwrap_or_else(|| "no details given".to_string());
        CliError::api(format!("{} failed: {}", action, detail))
    }

    /// The payload of a successful response
    pub fn into_data(mut self, action: &str) -> Result<T> {
        if !self.success {
            return Err(self.failure(action));
        }
        self.data
            .ok_or_else(|| CliError::api(format!("{} failed: response carried no data", action)))
    }

    /// Like [`into_data`](Self::into_data) but `null` data is allowed
    pub fn into_optional(mut self, action: &str) -> Result<Option<T>> {
        if !self.success {
            return Err(self.failure(action));
        }
        Ok(self.data)
    }
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// `"student"` or `{"role_name": "student"}`
    pub role: Role,
}

impl From<UserProfile> for SessionUser {
    fn from(profile: UserProfile) -> Self {
        let name = match (profile.first_name, profile.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(first), None) => Some(first),
            (None, last) => last,
        };
        SessionUser {
            id: profile.id,
            email: profile.email,
            role: profile.role,
            name,
        }
    }
}

// ============================================================================
// Scholarships and applications
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: ScholarshipId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub application_deadline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Document types this scholarship insists on; empty means the default
    /// catalogue applies
    #[serde(default)]
    pub required_documents: Vec<String>,
}

impl Scholarship {
    /// Upload rules for this scholarship
    ///
    /// Types named in `required_documents` become required, everything else
    /// keeps its default. Unknown names are ignored.
    pub fn document_catalogue(&self) -> Vec<DocumentRequirement> {
        let overrides: Vec<DocumentKind> = self
            .required_documents
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();

        DocumentKind::catalogue()
            .into_iter()
            .map(|mut requirement| {
                if !overrides.is_empty() {
                    requirement.required = overrides.contains(&requirement.kind);
                }
                requirement
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplicationRequest {
    pub scholarship_id: ScholarshipId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    #[serde(alias = "application_id")]
    pub id: ApplicationId,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Documents
// ============================================================================

/// A document stored on the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: DocumentId,
    pub document_type: String,
    #[serde(alias = "original_name")]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl RemoteDocument {
    pub fn kind(&self) -> Option<DocumentKind> {
        self.document_type.parse().ok()
    }
}

// ============================================================================
// Interviews
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewSlot {
    pub id: SlotId,
    pub scholarship_id: ScholarshipId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default)]
    pub booked_count: u32,
}

fn default_capacity() -> u32 {
    1
}

impl InterviewSlot {
    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.booked_count)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub slot_id: SlotId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub slot_id: SlotId,
    #[serde(default)]
    pub slot: Option<InterviewSlot>,
    #[serde(default = "default_booking_status")]
    pub status: String,
    #[serde(default)]
    pub booked_at: Option<DateTime<Utc>>,
}

fn default_booking_status() -> String {
    "booked".to_string()
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, alias = "type")]
    pub notification_type: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    #[serde(alias = "unread_count")]
    pub count: u64,
}
