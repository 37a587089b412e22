use super::state::StepState;
use super::store::DraftStore;
use crate::api::SubmitReceipt;
use crate::documents::DocumentUploader;
use crate::error::{CliError, Result};
use crate::review::{Consents, SubmissionGate};
use chrono::Utc;
use scholar_common::types::{ApplicationId, StepId};
use scholar_common::{ApplicationDraft, FieldErrors, SectionData, Validate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

/// Drives one application through the wizard steps
pub struct WizardController<S> {
    store: S,
    draft: ApplicationDraft,
    current: StepId,
    states: BTreeMap<StepId, StepState>,
    dirty: BTreeSet<StepId>,
    auto_advance: bool,
    locked: bool,
}

impl<S: DraftStore> WizardController<S> {
    /// Start from an already loaded draft
    ///
    /// A draft whose status is no longer `draft` starts locked.
    pub fn new(store: S, draft: ApplicationDraft) -> Self {
        let mut states = BTreeMap::new();
        for step in StepId::ALL {
            let state = if draft.is_step_complete(step) {
                StepState::Complete
            } else if draft.section(step).is_some() {
                StepState::Editing
            } else {
                StepState::Empty
            };
            states.insert(step, state);
        }

        let locked = !draft.status.is_editable();
        let mut controller = Self {
            store,
            draft,
            current: StepId::PersonalInfo,
            states,
            dirty: BTreeSet::new(),
            auto_advance: true,
            locked,
        };
        controller.current = if locked {
            StepId::Review
        } else {
            controller.first_incomplete()
        };
        controller
    }

    /// Rebuild the wizard from the backend copy of an application
    pub async fn resume(store: S, id: &ApplicationId) -> Result<Self> {
        let draft = store.load(id).await?;
        info!(
            application_id = %id,
            completed = draft.completed_count(),
            status = %draft.status,
            "Resumed application"
        );
        Ok(Self::new(store, draft))
    }

    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn draft(&self) -> &ApplicationDraft {
        &self.draft
    }

    pub fn current_step(&self) -> StepId {
        self.current
    }

    pub fn state(&self, step: StepId) -> &StepState {
        self.states.get(&step).unwrap_or(&StepState::Empty)
    }

    /// Field errors from the last failed validation of `step`
    pub fn errors(&self, step: StepId) -> Option<&FieldErrors> {
        self.state(step).errors()
    }

    pub fn is_complete(&self, step: StepId) -> bool {
        self.draft.is_step_complete(step)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether any edit has not reached the backend yet
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Lowest-numbered required step not yet complete; `Review` once all are
    pub fn first_incomplete(&self) -> StepId {
        StepId::ALL
            .iter()
            .copied()
            .find(|step| step.is_required() && !self.is_complete(*step))
            .unwrap_or(StepId::Review)
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.locked {
            Err(CliError::Locked)
        } else {
            Ok(())
        }
    }

    fn set_state(&mut self, step: StepId, state: StepState) {
        debug!(step = %step, state = %state, "Step state");
        self.states.insert(step, state);
    }

    /// Keep unsaved edits in the aggregate
    ///
    /// A complete step stays complete only while its data still validates.
    pub fn edit(&mut self, section: SectionData) -> Result<()> {
        self.ensure_unlocked()?;
        let step = section.step();
        let valid = section.validate().is_empty();
        self.draft.upsert_section(section);
        self.dirty.insert(step);
        if !valid && self.draft.completed_steps.remove(&step.index()) {
            debug!(step = %step, "Edit invalidated a complete step");
        }
        if !self.is_complete(step) {
            self.set_state(step, StepState::Editing);
        }
        Ok(())
    }

    /// Validate a section and persist it
    ///
    /// Invalid input is kept in the aggregate, recorded as the step's field
    /// errors and never reaches the store. A backend failure leaves the step
    /// incomplete. On success the step joins the completed set and, with
    /// auto-advance on, the wizard moves past it.
    pub async fn save_step(&mut self, section: SectionData) -> Result<()> {
        self.ensure_unlocked()?;
        let step = section.step();

        self.set_state(step, StepState::Validating);
        let errors = section.validate();
        if !errors.is_empty() {
            self.draft.upsert_section(section);
            self.draft.completed_steps.remove(&step.index());
            self.dirty.insert(step);
            self.set_state(step, StepState::Invalid(errors.clone()));
            return Err(CliError::Validation(errors));
        }

        self.set_state(step, StepState::Saving);
        if let Err(err) = self.store.save_section(&self.draft.id, &section).await {
            warn!(step = %step, error = %err, "Section save failed");
            self.draft.upsert_section(section);
            self.dirty.insert(step);
            self.set_state(step, StepState::SaveFailed(err.to_string()));
            return Err(err);
        }

        self.draft.upsert_section(section);
        self.draft.completed_steps.insert(step.index());
        self.draft.updated_at = Some(Utc::now());
        self.dirty.remove(&step);
        self.set_state(step, StepState::Complete);
        info!(application_id = %self.draft.id, step = %step, "Section saved");

        if self.auto_advance && self.current == step {
            if let Some(next) = step.next() {
                self.current = next;
            }
        }
        Ok(())
    }

    /// Move forward; the current step must be complete
    pub fn next(&mut self) -> Result<StepId> {
        let Some(next) = self.current.next() else {
            return Err(CliError::navigation("already on the last step"));
        };
        if !self.is_complete(self.current) {
            return Err(CliError::navigation(format!(
                "complete step {} ({}) before continuing",
                self.current.index(),
                self.current.title()
            )));
        }
        self.current = next;
        Ok(next)
    }

    /// Move back one step; stays put on the first step
    pub fn back(&mut self) -> StepId {
        if let Some(previous) = self.current.previous() {
            self.current = previous;
        }
        self.current
    }

    /// Open any completed step, or the first incomplete one
    pub fn jump_to(&mut self, step: StepId) -> Result<()> {
        if step == self.current || self.is_complete(step) || step == self.first_incomplete() {
            self.current = step;
            Ok(())
        } else {
            Err(CliError::navigation(format!(
                "step {} ({}) is not reachable yet; finish step {} first",
                step.index(),
                step.title(),
                self.first_incomplete().index()
            )))
        }
    }

    /// Persist the whole aggregate without validation
    pub async fn save_draft(&mut self) -> Result<()> {
        self.ensure_unlocked()?;
        self.store.save_draft(&self.draft).await?;
        self.dirty.clear();
        self.draft.updated_at = Some(Utc::now());
        info!(application_id = %self.draft.id, "Draft saved");
        Ok(())
    }

    /// Mark the documents step complete once every required type is uploaded
    pub fn complete_documents_step(&mut self, documents: &DocumentUploader) -> Result<()> {
        self.ensure_unlocked()?;
        let missing = documents.missing_required();
        if !missing.is_empty() {
            let names: Vec<String> = missing
                .iter()
                .map(|kind| kind.requirement().label.to_string())
                .collect();
            return Err(CliError::navigation(format!(
                "required documents missing: {}",
                names.join(", ")
            )));
        }

        self.draft.completed_steps.insert(StepId::Documents.index());
        self.set_state(StepId::Documents, StepState::Complete);
        if self.auto_advance && self.current == StepId::Documents {
            self.current = StepId::Review;
        }
        Ok(())
    }

    /// Submit through the gate; locks the wizard on success
    pub async fn submit(
        &mut self,
        documents: &DocumentUploader,
        consents: Consents,
    ) -> Result<SubmitReceipt> {
        self.ensure_unlocked()?;

        let reasons = SubmissionGate::new(&self.draft, documents, consents).blocking_reasons();
        if !reasons.is_empty() {
            return Err(CliError::SubmissionBlocked(
                reasons.iter().map(ToString::to_string).collect(),
            ));
        }

        let receipt = self.store.submit(&self.draft.id).await?;
        self.draft.status = receipt.status;
        self.draft.submitted_at = receipt.submitted_at.or_else(|| Some(Utc::now()));
        self.locked = true;
        self.current = StepId::Review;
        info!(application_id = %self.draft.id, status = %receipt.status, "Application submitted");
        Ok(receipt)
    }
}

/// Save the draft every `every` while it has unsaved edits
///
/// Stops when `shutdown` flips to `true` or its sender is dropped, when the
/// wizard gets locked, or when the session expires. Other save failures are
/// logged and retried on the next tick. Returns the number of saves made.
pub async fn run_autosave<S: DraftStore>(
    controller: Arc<Mutex<WizardController<S>>>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> usize {
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut saves = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut wizard = controller.lock().await;
                if wizard.is_locked() {
                    break;
                }
                if !wizard.is_dirty() {
                    continue;
                }
                match wizard.save_draft().await {
                    Ok(()) => saves += 1,
                    Err(err) if err.is_session_expired() => {
                        warn!("Autosave stopped: session expired");
                        break;
                    }
                    Err(err) => warn!(error = %err, "Autosave failed"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    debug!(saves, "Autosave finished");
    saves
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::documents::tests::{upload_all_required, FakeTransport};
    use crate::wizard::store::memory::MemoryStore;
    use scholar_common::sections::{FinancialInfo, PersonalInfo};
    use scholar_common::ApplicationStatus;

    fn new_draft() -> ApplicationDraft {
        ApplicationDraft::new("app-1".into(), "sch-1".into())
    }

    fn wizard() -> WizardController<MemoryStore> {
        WizardController::new(MemoryStore::default(), new_draft())
    }

    fn financial() -> SectionData {
        let mut info = FinancialInfo::new(20_000.0, 4);
        info.income_source = "salary".to_string();
        SectionData::Financial(info)
    }

    fn personal() -> SectionData {
        SectionData::PersonalInfo(PersonalInfo {
            title: "Ms.".to_string(),
            first_name: "Somsri".to_string(),
            last_name: "Jaidee".to_string(),
            citizen_id: "1103700012345".to_string(),
            birth_date: "2006-05-01".to_string(),
            gender: "female".to_string(),
            nationality: "Thai".to_string(),
            religion: String::new(),
            phone: "0812345678".to_string(),
            email: "somsri@example.ac.th".to_string(),
        })
    }

    #[tokio::test]
    async fn test_invalid_section_never_reaches_store() {
        let mut wizard = wizard();
        let mut info = PersonalInfo::default();
        info.first_name = "Somsri".to_string();

        let err = wizard.save_step(SectionData::PersonalInfo(info)).await.unwrap_err();

        assert!(matches!(err, CliError::Validation(_)));
        assert_eq!(wizard.store().section_save_count(), 0);
        let errors = wizard.errors(StepId::PersonalInfo).unwrap();
        assert_eq!(errors.get("last_name"), Some("This field is required"));
        assert!(!wizard.is_complete(StepId::PersonalInfo));
        assert!(wizard.is_dirty());
        assert_eq!(wizard.current_step(), StepId::PersonalInfo);
    }

    #[tokio::test]
    async fn test_save_marks_complete_once_and_advances() {
        let mut wizard = wizard();

        wizard.save_step(personal()).await.unwrap();
        assert_eq!(wizard.current_step(), StepId::Address);
        assert_eq!(*wizard.state(StepId::PersonalInfo), StepState::Complete);

        wizard.jump_to(StepId::PersonalInfo).unwrap();
        wizard.save_step(personal()).await.unwrap();

        let completed: Vec<u8> = wizard.draft().completed_steps.iter().copied().collect();
        assert_eq!(completed, vec![1]);
        assert_eq!(wizard.store().section_save_count(), 2);
        assert!(!wizard.is_dirty());
    }

    #[tokio::test]
    async fn test_backend_failure_does_not_complete() {
        let mut wizard = WizardController::new(MemoryStore::failing("database down"), new_draft());

        let err = wizard.save_step(personal()).await.unwrap_err();
        assert!(err.to_string().contains("database down"));
        assert!(!wizard.is_complete(StepId::PersonalInfo));
        assert_eq!(wizard.current_step(), StepId::PersonalInfo);
        assert!(matches!(wizard.state(StepId::PersonalInfo), StepState::SaveFailed(_)));
        assert!(wizard.draft().section(StepId::PersonalInfo).is_some());
    }

    #[tokio::test]
    async fn test_navigation_rules() {
        let mut wizard = wizard();
        assert!(wizard.next().is_err());
        assert!(wizard.jump_to(StepId::Financial).is_err());

        wizard.save_step(personal()).await.unwrap();
        assert_eq!(wizard.back(), StepId::PersonalInfo);
        assert_eq!(wizard.back(), StepId::PersonalInfo);
        assert_eq!(wizard.next().unwrap(), StepId::Address);

        // Saving out of order does not unlock later steps
        wizard.save_step(financial()).await.unwrap();
        assert_eq!(wizard.current_step(), StepId::Address);
        wizard.jump_to(StepId::Financial).unwrap();
        assert!(wizard.jump_to(StepId::Family).is_err());
        wizard.jump_to(StepId::Address).unwrap();
    }

    #[tokio::test]
    async fn test_failed_revalidation_uncompletes_step() {
        let mut wizard = wizard();
        wizard.save_step(financial()).await.unwrap();
        assert!(wizard.is_complete(StepId::Financial));

        let mut broken = FinancialInfo::new(20_000.0, 0);
        broken.income_source = "salary".to_string();
        assert!(wizard.save_step(SectionData::Financial(broken)).await.is_err());
        assert!(!wizard.is_complete(StepId::Financial));
        assert!(wizard.errors(StepId::Financial).unwrap().contains("family_member_count"));
    }

    #[tokio::test]
    async fn test_invalid_edit_uncompletes_step() {
        let transport = FakeTransport::default();
        let mut documents = DocumentUploader::new(ApplicationId::new("app-1"));
        upload_all_required(&mut documents, &transport).await;

        let mut draft = new_draft();
        draft.completed_steps = (1..=7).collect();
        draft.upsert_section(personal());
        let mut wizard = WizardController::new(MemoryStore::default(), draft);

        // Valid edits keep the step complete
        wizard.edit(personal()).unwrap();
        assert!(wizard.is_complete(StepId::PersonalInfo));

        wizard.edit(SectionData::PersonalInfo(PersonalInfo::default())).unwrap();
        assert!(!wizard.is_complete(StepId::PersonalInfo));
        assert_eq!(*wizard.state(StepId::PersonalInfo), StepState::Editing);

        wizard.save_draft().await.unwrap();
        let stored = wizard.store().drafts.lock().unwrap()[&ApplicationId::new("app-1")].clone();
        assert!(!stored.is_step_complete(StepId::PersonalInfo));

        let err = wizard.submit(&documents, Consents::accepted()).await.unwrap_err();
        assert!(matches!(err, CliError::SubmissionBlocked(_)));
        assert_eq!(*wizard.store().submits.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_draft_skips_validation() {
        let mut wizard = wizard();
        wizard.edit(SectionData::PersonalInfo(PersonalInfo::default())).unwrap();
        assert!(wizard.is_dirty());
        assert_eq!(*wizard.state(StepId::PersonalInfo), StepState::Editing);

        wizard.save_draft().await.unwrap();
        assert!(!wizard.is_dirty());
        assert_eq!(*wizard.store().draft_saves.lock().unwrap(), 1);
        assert!(!wizard.is_complete(StepId::PersonalInfo));
    }

    #[tokio::test]
    async fn test_resume_restores_progress() {
        let mut draft = new_draft();
        draft.completed_steps = [1, 2, 3].into_iter().collect();
        draft.upsert_section(financial());
        let store = MemoryStore::with_draft(draft);

        let wizard = WizardController::resume(store, &ApplicationId::new("app-1")).await.unwrap();
        assert_eq!(wizard.current_step(), StepId::Family);
        assert_eq!(*wizard.state(StepId::Financial), StepState::Editing);
        assert_eq!(*wizard.state(StepId::Address), StepState::Complete);
    }

    #[tokio::test]
    async fn test_documents_step_needs_required_uploads() {
        let transport = FakeTransport::default();
        let mut documents = DocumentUploader::new(ApplicationId::new("app-1"));
        let mut wizard = wizard();

        assert!(wizard.complete_documents_step(&documents).is_err());
        assert!(!wizard.is_complete(StepId::Documents));

        upload_all_required(&mut documents, &transport).await;
        wizard.complete_documents_step(&documents).unwrap();
        assert!(wizard.is_complete(StepId::Documents));
    }

    #[tokio::test]
    async fn test_submit_gated_then_locked() {
        let transport = FakeTransport::default();
        let mut documents = DocumentUploader::new(ApplicationId::new("app-1"));
        upload_all_required(&mut documents, &transport).await;

        let mut draft = new_draft();
        draft.completed_steps = (1..=6).collect();
        let mut wizard = WizardController::new(MemoryStore::default(), draft);

        let err = wizard.submit(&documents, Consents::accepted()).await.unwrap_err();
        assert!(err.to_string().contains("Step 7 (Documents) is incomplete"));

        wizard.complete_documents_step(&documents).unwrap();
        let err = wizard.submit(&documents, Consents::default()).await.unwrap_err();
        assert!(matches!(err, CliError::SubmissionBlocked(reasons) if reasons.len() == 2));
        assert_eq!(*wizard.store().submits.lock().unwrap(), 0);

        let receipt = wizard.submit(&documents, Consents::accepted()).await.unwrap();
        assert_eq!(receipt.status, ApplicationStatus::Submitted);
        assert!(wizard.is_locked());
        assert!(wizard.draft().submitted_at.is_some());

        assert!(matches!(wizard.save_step(personal()).await, Err(CliError::Locked)));
        assert!(matches!(wizard.save_draft().await, Err(CliError::Locked)));
    }

    #[test]
    fn test_submitted_draft_starts_locked() {
        let mut draft = new_draft();
        draft.status = ApplicationStatus::UnderReview;
        let mut wizard = WizardController::new(MemoryStore::default(), draft);

        assert!(wizard.is_locked());
        assert_eq!(wizard.current_step(), StepId::Review);
        assert!(matches!(
            wizard.edit(SectionData::PersonalInfo(PersonalInfo::default())),
            Err(CliError::Locked)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autosave_saves_only_when_dirty() {
        let wizard = Arc::new(Mutex::new(wizard()));
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn(run_autosave(wizard.clone(), Duration::from_secs(60), stop_rx));

        // Nothing to save on the first tick
        tokio::time::sleep(Duration::from_secs(61)).await;
        wizard
            .lock()
            .await
            .edit(SectionData::PersonalInfo(PersonalInfo::default()))
            .unwrap();

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!wizard.lock().await.is_dirty());

        tokio::time::sleep(Duration::from_secs(120)).await;
        stop_tx.send(true).unwrap();

        assert_eq!(task.await.unwrap(), 1);
        assert_eq!(*wizard.lock().await.store().draft_saves.lock().unwrap(), 1);
    }
}
