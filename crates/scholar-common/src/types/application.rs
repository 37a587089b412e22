//! Application draft aggregate

use super::ids::{ApplicationId, ScholarshipId};
use super::step::StepId;
use crate::sections::SectionData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle state of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Draft,
    Submitted,
    UnderReview,
    Interview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Only drafts accept section saves and uploads
    pub fn is_editable(self) -> bool {
        self == ApplicationStatus::Draft
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under review",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        };
        f.write_str(label)
    }
}

/// An application as the wizard sees it: one record per scholarship per
/// student, made of independently saved sections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDraft {
    pub id: ApplicationId,

    pub scholarship_id: ScholarshipId,

    #[serde(default)]
    pub status: ApplicationStatus,

    /// 1-based indices of completed steps
    #[serde(default)]
    pub completed_steps: BTreeSet<u8>,

    /// At most one entry per step
    #[serde(default)]
    pub sections: Vec<SectionData>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ApplicationDraft {
    pub fn new(id: ApplicationId, scholarship_id: ScholarshipId) -> Self {
        Self {
            id,
            scholarship_id,
            status: ApplicationStatus::Draft,
            completed_steps: BTreeSet::new(),
            sections: Vec::new(),
            submitted_at: None,
            updated_at: None,
        }
    }

    pub fn section(&self, step: StepId) -> Option<&SectionData> {
        self.sections.iter().find(|section| section.step() == step)
    }

    /// Insert or replace the section for its step
    pub fn upsert_section(&mut self, section: SectionData) {
        match self.sections.iter_mut().find(|s| s.step() == section.step()) {
            Some(existing) => *existing = section,
            None => {
                self.sections.push(section);
                self.sections.sort_by_key(|s| s.step());
            }
        }
    }

    pub fn is_step_complete(&self, step: StepId) -> bool {
        self.completed_steps.contains(&step.index())
    }

    /// Completed required steps, ignoring indices the wizard does not know
    pub fn completed_count(&self) -> usize {
        self.completed_steps
            .iter()
            .filter_map(|index| StepId::from_index(*index))
            .filter(|step| step.is_required())
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::sections::{FinancialInfo, PersonalInfo};

    #[test]
    fn test_upsert_replaces_same_step() {
        let mut draft = ApplicationDraft::new("app-1".into(), "sch-1".into());

        let mut first = PersonalInfo::default();
        first.first_name = "Somchai".to_string();
        draft.upsert_section(SectionData::PersonalInfo(first));

        let mut second = PersonalInfo::default();
        second.first_name = "Somsri".to_string();
        draft.upsert_section(SectionData::PersonalInfo(second));

        assert_eq!(draft.sections.len(), 1);
        match draft.section(StepId::PersonalInfo) {
            Some(SectionData::PersonalInfo(info)) => assert_eq!(info.first_name, "Somsri"),
            other => panic!("unexpected section: {:?}", other),
        }
    }

    #[test]
    fn test_sections_kept_in_step_order() {
        let mut draft = ApplicationDraft::new("app-1".into(), "sch-1".into());
        draft.upsert_section(SectionData::Financial(FinancialInfo::default()));
        draft.upsert_section(SectionData::PersonalInfo(PersonalInfo::default()));

        let steps: Vec<StepId> = draft.sections.iter().map(|s| s.step()).collect();
        assert_eq!(steps, vec![StepId::PersonalInfo, StepId::Financial]);
    }

    #[test]
    fn test_deserialize_backend_draft() {
        let json = r#"{
            "id": 17,
            "scholarship_id": "sch-2026",
            "status": "draft",
            "completed_steps": [1, 2, 2, 9],
            "sections": [
                {"step": "financial", "data": {"family_income": 20000, "family_member_count": 4}}
            ]
        }"#;

        let draft: ApplicationDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.id.as_str(), "17");
        assert_eq!(draft.completed_steps.len(), 3);
        assert_eq!(draft.completed_count(), 2);
        assert!(draft.status.is_editable());

        match draft.section(StepId::Financial) {
            Some(SectionData::Financial(info)) => assert_eq!(info.income_per_member(), 5000.0),
            other => panic!("unexpected section: {:?}", other),
        }
    }

    #[test]
    fn test_submitted_is_not_editable() {
        assert!(!ApplicationStatus::Submitted.is_editable());
        assert!(!ApplicationStatus::Approved.is_editable());
    }
}
