//! Persistence seam between the wizard and the backend

use crate::api::SubmitReceipt;
use crate::error::Result;
use async_trait::async_trait;
use scholar_common::types::ApplicationId;
use scholar_common::{ApplicationDraft, SectionData};

/// Where drafts live
///
/// The HTTP client is the production implementation; tests use an
/// in-memory one.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn load(&self, id: &ApplicationId) -> Result<ApplicationDraft>;

    /// Persist one validated section
    async fn save_section(&self, id: &ApplicationId, section: &SectionData) -> Result<()>;

    /// Persist the whole aggregate as-is, without validation
    async fn save_draft(&self, draft: &ApplicationDraft) -> Result<()>;

    async fn submit(&self, id: &ApplicationId) -> Result<SubmitReceipt>;
}

#[async_trait]
impl<S: DraftStore + ?Sized> DraftStore for std::sync::Arc<S> {
    async fn load(&self, id: &ApplicationId) -> Result<ApplicationDraft> {
        (**self).load(id).await
    }

    async fn save_section(&self, id: &ApplicationId, section: &SectionData) -> Result<()> {
        (**self).save_section(id, section).await
    }

    async fn save_draft(&self, draft: &ApplicationDraft) -> Result<()> {
        (**self).save_draft(draft).await
    }

    async fn submit(&self, id: &ApplicationId) -> Result<SubmitReceipt> {
        (**self).submit(id).await
    }
}
