//! HTTP API client for the scholarship portal
//!
//! Every request goes through [`ApiClient::dispatch`], which attaches the
//! bearer token and turns HTTP failures into [`CliError`]s. A 401 expires the
//! shared session in one place instead of at every call site.

use crate::api::{endpoints, types::*};
use crate::config::{Config, DEFAULT_API_TIMEOUT_SECS};
use crate::documents::{DocumentTransport, UploadFile};
use crate::error::{CliError, Result};
use crate::notifications::NotificationFeed;
use crate::session::SessionHandle;
use crate::wizard::DraftStore;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use scholar_common::types::{
    mime_for_extension, ApplicationId, DocumentId, DocumentKind, NotificationId, ScholarshipId,
    SlotId,
};
use scholar_common::{ApplicationDraft, SectionData};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Uploads are streamed in pieces this size so progress can be reported
const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// API client for the portal backend
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: SessionHandle) -> Result<Self> {
        Self::with_timeout(base_url, session, Duration::from_secs(DEFAULT_API_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        session: SessionHandle,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn from_config(config: &Config, session: SessionHandle) -> Result<Self> {
        Self::with_timeout(
            config.server_url(),
            session,
            Duration::from_secs(config.api_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Send a request and map unsuccessful statuses
    async fn dispatch(&self, request: RequestBuilder, expire_on_401: bool) -> Result<Response> {
        let request = match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = error_detail(response).await;
        debug!(status = %status, detail = %detail, "Request failed");

        match status {
            StatusCode::UNAUTHORIZED if expire_on_401 => {
                let redirect = self.session.expire();
                warn!(redirect = ?redirect, "Session expired");
                Err(CliError::SessionExpired { redirect })
            }
            StatusCode::UNAUTHORIZED => Err(CliError::Unauthorized(detail)),
            StatusCode::FORBIDDEN => Err(CliError::forbidden(detail)),
            StatusCode::NOT_FOUND => Err(CliError::NotFound(detail)),
            _ => Err(CliError::api(format!("{} ({})", detail, status))),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let response = self.dispatch(request, true).await?;
        let body: ApiResponse<T> = response.json().await?;
        body.into_data(action)
    }

    async fn fetch_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        action: &str,
    ) -> Result<Option<T>> {
        let response = self.dispatch(request, true).await?;
        let body: ApiResponse<T> = response.json().await?;
        body.into_optional(action)
    }

    /// For calls whose response carries no payload; an empty body counts as
    /// success
    async fn execute(&self, request: RequestBuilder, action: &str) -> Result<()> {
        let response = self.dispatch(request, true).await?;
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let body: ApiResponse<serde_json::Value> = serde_json::from_slice(&bytes)?;
        body.into_optional(action).map(|_| ())
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Exchange credentials for a token
    ///
    /// A 401 here means bad credentials, not an expired session.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = endpoints::login_url(&self.base_url);
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = match self.dispatch(self.client.post(&url).json(&request), false).await {
            Err(CliError::Unauthorized(_)) => {
                return Err(CliError::Unauthorized("invalid email or password".to_string()))
            }
            other => other?,
        };

        let body: ApiResponse<LoginResponse> = response.json().await?;
        body.into_data("Login")
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    // ========================================================================
    // Scholarships and applications
    // ========================================================================

    #[tracing::instrument(skip(self))]
    pub async fn get_scholarship(&self, id: &ScholarshipId) -> Result<Scholarship> {
        let url = endpoints::public_scholarship_url(&self.base_url, id);
        self.fetch(self.client.get(&url), "Loading scholarship").await
    }

    /// The caller's application for a scholarship, if one exists
    #[tracing::instrument(skip(self))]
    pub async fn find_my_application(
        &self,
        scholarship_id: &ScholarshipId,
    ) -> Result<Option<ApplicationDraft>> {
        let url = endpoints::my_application_url(&self.base_url, scholarship_id);
        match self.fetch_optional(self.client.get(&url), "Finding application").await {
            Err(CliError::NotFound(_)) => Ok(None),
            other => other,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_application(&self, scholarship_id: &ScholarshipId) -> Result<ApplicationDraft> {
        let url = endpoints::applications_url(&self.base_url);
        let request = CreateApplicationRequest {
            scholarship_id: scholarship_id.clone(),
        };
        let draft: ApplicationDraft = self
            .fetch(self.client.post(&url).json(&request), "Creating application")
            .await?;
        info!(application_id = %draft.id, "Created application");
        Ok(draft)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationDraft> {
        let url = endpoints::application_url(&self.base_url, id);
        self.fetch(self.client.get(&url), "Loading application").await
    }

    // ========================================================================
    // Documents
    // ========================================================================

    /// Stream `file` as a multipart upload, reporting progress as the body
    /// is consumed
    ///
    /// Progress stops at 99 until the backend accepts the file.
    #[tracing::instrument(skip(self, file, progress), fields(file = %file.file_name, size = file.size()))]
    pub async fn upload_document(
        &self,
        application_id: &ApplicationId,
        kind: DocumentKind,
        file: UploadFile,
        progress: watch::Sender<u8>,
    ) -> Result<RemoteDocument> {
        let url = endpoints::document_upload_url(&self.base_url, application_id);
        let mime = mime_for_extension(file.extension().unwrap_or_default());
        let total = file.size();

        let progress = Arc::new(progress);
        let reporter = progress.clone();
        let mut sent = 0u64;
        let chunks: Vec<Vec<u8>> = file
            .bytes
            .chunks(UPLOAD_CHUNK_SIZE)
            .map(<[u8]>::to_vec)
            .collect();
        let stream = futures::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            let percent = (sent * 99 / total.max(1)).min(99) as u8;
            reporter.send_replace(percent);
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file.file_name.clone())
            .mime_str(mime.as_ref())?;
        let form = Form::new()
            .part("file", part)
            .text("document_type", kind.as_str())
            .text("application_id", application_id.to_string());

        let document: RemoteDocument = self
            .fetch(self.client.post(&url).multipart(form), "Uploading document")
            .await?;
        progress.send_replace(100);
        info!(document_id = %document.id, kind = %kind, "Uploaded document");
        Ok(document)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_documents(&self, application_id: &ApplicationId) -> Result<Vec<RemoteDocument>> {
        let url = endpoints::documents_url(&self.base_url, application_id);
        Ok(self
            .fetch_optional(self.client.get(&url), "Listing documents")
            .await?
            .unwrap_or_default())
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_document(&self, id: &DocumentId) -> Result<()> {
        let url = endpoints::document_url(&self.base_url, id);
        self.execute(self.client.delete(&url), "Deleting document").await
    }

    // ========================================================================
    // Interviews
    // ========================================================================

    #[tracing::instrument(skip(self))]
    pub async fn interview_slots(&self, scholarship_id: &ScholarshipId) -> Result<Vec<InterviewSlot>> {
        let url = endpoints::interview_slots_url(&self.base_url, scholarship_id);
        Ok(self
            .fetch_optional(self.client.get(&url), "Listing interview slots")
            .await?
            .unwrap_or_default())
    }

    #[tracing::instrument(skip(self))]
    pub async fn book_interview(&self, slot_id: &SlotId) -> Result<Booking> {
        let url = endpoints::interview_bookings_url(&self.base_url);
        let request = BookingRequest {
            slot_id: slot_id.clone(),
        };
        self.fetch(self.client.post(&url).json(&request), "Booking interview")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn my_bookings(&self) -> Result<Vec<Booking>> {
        let url = endpoints::my_interview_bookings_url(&self.base_url);
        Ok(self
            .fetch_optional(self.client.get(&url), "Listing bookings")
            .await?
            .unwrap_or_default())
    }

    // ========================================================================
    // Notifications
    // ========================================================================

    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let url = endpoints::notifications_url(&self.base_url);
        Ok(self
            .fetch_optional(self.client.get(&url), "Listing notifications")
            .await?
            .unwrap_or_default())
    }

    pub async fn unread_notification_count(&self) -> Result<u64> {
        let url = endpoints::unread_count_url(&self.base_url);
        let count: UnreadCount = self.fetch(self.client.get(&url), "Counting notifications").await?;
        Ok(count.count)
    }

    pub async fn mark_read(&self, id: &NotificationId) -> Result<()> {
        let url = endpoints::notification_read_url(&self.base_url, id);
        self.execute(self.client.put(&url), "Marking notification read").await
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        let url = endpoints::read_all_notifications_url(&self.base_url);
        self.execute(self.client.put(&url), "Marking notifications read").await
    }

    pub async fn delete_notification(&self, id: &NotificationId) -> Result<()> {
        let url = endpoints::notification_url(&self.base_url, id);
        self.execute(self.client.delete(&url), "Deleting notification").await
    }
}

/// Best human-readable reason from an error response
async fn error_detail(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiResponse<serde_json::Value>>(&text) {
        Ok(body) => body
            .error
            .or(body.message)
            .unwrap_or_else(|| status.to_string()),
        Err(_) if !text.trim().is_empty() => text.trim().to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl DraftStore for ApiClient {
    async fn load(&self, id: &ApplicationId) -> Result<ApplicationDraft> {
        self.get_application(id).await
    }

    async fn save_section(&self, id: &ApplicationId, section: &SectionData) -> Result<()> {
        let url = endpoints::section_url(&self.base_url, id, section.step());
        let payload = section.payload()?;
        self.execute(self.client.post(&url).json(&payload), "Saving section")
            .await
    }

    async fn save_draft(&self, draft: &ApplicationDraft) -> Result<()> {
        let url = endpoints::draft_url(&self.base_url, &draft.id);
        self.execute(self.client.post(&url).json(draft), "Saving draft")
            .await
    }

    async fn submit(&self, id: &ApplicationId) -> Result<SubmitReceipt> {
        let url = endpoints::submit_url(&self.base_url, id);
        self.fetch(self.client.post(&url), "Submitting application")
            .await
    }
}

#[async_trait]
impl DocumentTransport for ApiClient {
    async fn upload(
        &self,
        application_id: &ApplicationId,
        kind: DocumentKind,
        file: UploadFile,
        progress: watch::Sender<u8>,
    ) -> Result<RemoteDocument> {
        self.upload_document(application_id, kind, file, progress).await
    }

    async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.delete_document(id).await
    }

    async fn list(&self, application_id: &ApplicationId) -> Result<Vec<RemoteDocument>> {
        self.list_documents(application_id).await
    }
}

#[async_trait]
impl NotificationFeed for ApiClient {
    async fn unread_count(&self) -> Result<u64> {
        self.unread_notification_count().await
    }

    async fn recent(&self) -> Result<Vec<Notification>> {
        self.notifications().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/api/", SessionHandle::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }
}
