//! Review page and submission gate

use crate::documents::{DocumentUploader, UploadStatus};
use scholar_common::types::{ApplicationStatus, DocumentKind, StepId};
use scholar_common::ApplicationDraft;
use serde_json::Value;
use std::fmt;

/// The two acknowledgements required before submitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Consents {
    /// "The information I provided is true and complete"
    pub information_accurate: bool,
    /// "I accept the scholarship terms and conditions"
    pub terms_accepted: bool,
}

impl Consents {
    pub fn accepted() -> Self {
        Self {
            information_accurate: true,
            terms_accepted: true,
        }
    }

    pub fn all_given(&self) -> bool {
        self.information_accurate && self.terms_accepted
    }
}

/// Why the submit button is disabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockingReason {
    NotADraft(ApplicationStatus),
    IncompleteStep(StepId),
    MissingDocument(DocumentKind),
    InformationNotConfirmed,
    TermsNotAccepted,
}

impl fmt::Display for BlockingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockingReason::NotADraft(status) => write!(f, "Application is already {}", status),
            BlockingReason::IncompleteStep(step) => {
                write!(f, "Step {} ({}) is incomplete", step.index(), step.title())
            }
            BlockingReason::MissingDocument(kind) => {
                write!(f, "Required document missing: {}", kind.requirement().label)
            }
            BlockingReason::InformationNotConfirmed => {
                f.write_str("Confirm that the information provided is accurate")
            }
            BlockingReason::TermsNotAccepted => {
                f.write_str("Accept the scholarship terms and conditions")
            }
        }
    }
}

/// Percentage of required steps completed, rounded
pub fn completion_percent(draft: &ApplicationDraft) -> u8 {
    let completed = draft.completed_count().min(StepId::TOTAL_REQUIRED);
    ((completed as f64 * 100.0) / StepId::TOTAL_REQUIRED as f64).round() as u8
}

/// Decides whether an application may be submitted
pub struct SubmissionGate<'a> {
    draft: &'a ApplicationDraft,
    documents: &'a DocumentUploader,
    consents: Consents,
}

impl<'a> SubmissionGate<'a> {
    pub fn new(draft: &'a ApplicationDraft, documents: &'a DocumentUploader, consents: Consents) -> Self {
        Self {
            draft,
            documents,
            consents,
        }
    }

    /// Everything standing between the user and a successful submit, in
    /// display order
    pub fn blocking_reasons(&self) -> Vec<BlockingReason> {
        let mut reasons = Vec::new();

        if !self.draft.status.is_editable() {
            reasons.push(BlockingReason::NotADraft(self.draft.status));
            return reasons;
        }

        reasons.extend(
            StepId::ALL
                .iter()
                .copied()
                .filter(|step| step.is_required() && !self.draft.is_step_complete(*step))
                .map(BlockingReason::IncompleteStep),
        );
        reasons.extend(
            self.documents
                .missing_required()
                .into_iter()
                .map(BlockingReason::MissingDocument),
        );

        if !self.consents.information_accurate {
            reasons.push(BlockingReason::InformationNotConfirmed);
        }
        if !self.consents.terms_accepted {
            reasons.push(BlockingReason::TermsNotAccepted);
        }

        reasons
    }

    pub fn can_submit(&self) -> bool {
        self.blocking_reasons().is_empty()
    }

    pub fn completion_percent(&self) -> u8 {
        completion_percent(self.draft)
    }
}

/// Read-only rendering of everything entered so far
pub struct ReviewSummary<'a> {
    draft: &'a ApplicationDraft,
    documents: &'a DocumentUploader,
}

impl<'a> ReviewSummary<'a> {
    pub fn new(draft: &'a ApplicationDraft, documents: &'a DocumentUploader) -> Self {
        Self { draft, documents }
    }
}

impl fmt::Display for ReviewSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Application {} ({}), {}% complete",
            self.draft.id,
            self.draft.status,
            completion_percent(self.draft)
        )?;

        for step in StepId::ALL.iter().copied().filter(|step| step.has_form()) {
            let mark = if self.draft.is_step_complete(step) { "done" } else { "todo" };
            writeln!(f)?;
            writeln!(f, "[{}] {}. {}", mark, step.index(), step.title())?;

            match self.draft.section(step).and_then(|section| section.payload().ok()) {
                Some(Value::Object(fields)) => {
                    for (name, value) in fields.iter().filter(|(name, _)| name.as_str() != "id") {
                        write_value(f, name, value, 1)?;
                    }
                }
                _ => writeln!(f, "    (nothing entered)")?,
            }
        }

        writeln!(f)?;
        let mark = if self.draft.is_step_complete(StepId::Documents) { "done" } else { "todo" };
        writeln!(f, "[{}] {}. {}", mark, StepId::Documents.index(), StepId::Documents.title())?;
        for record in self.documents.records() {
            let status = match &record.status {
                UploadStatus::Missing => "not uploaded".to_string(),
                UploadStatus::Uploading { progress } => format!("uploading {}%", progress),
                UploadStatus::Success => record.file_name.clone().unwrap_or_else(|| "uploaded".to_string()),
                UploadStatus::Error { message } => format!("failed: {}", message),
            };
            let required = if record.required { "*" } else { " " };
            writeln!(f, "    {}{}: {}", required, record.kind, status)?;
        }

        Ok(())
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, name: &str, value: &Value, depth: usize) -> fmt::Result {
    let indent = "    ".repeat(depth);
    match value {
        Value::Null => Ok(()),
        Value::String(s) if s.is_empty() => Ok(()),
        Value::String(s) => writeln!(f, "{}{}: {}", indent, name, s),
        Value::Object(fields) => {
            writeln!(f, "{}{}:", indent, name)?;
            for (child, value) in fields {
                write_value(f, child, value, depth + 1)?;
            }
            Ok(())
        }
        Value::Array(rows) => writeln!(f, "{}{}: {} entries", indent, name, rows.len()),
        other => writeln!(f, "{}{}: {}", indent, name, other),
    }
}
