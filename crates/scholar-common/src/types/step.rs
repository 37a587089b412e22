//! Wizard steps

use crate::error::PortalError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One page of the application wizard, in display order.
///
/// Steps are numbered from 1. The first seven must be completed before the
/// application can be submitted; `Review` only summarises the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    PersonalInfo,
    Address,
    Education,
    Family,
    Financial,
    Activities,
    Documents,
    Review,
}

impl StepId {
    /// Every step in wizard order
    pub const ALL: [StepId; 8] = [
        StepId::PersonalInfo,
        StepId::Address,
        StepId::Education,
        StepId::Family,
        StepId::Financial,
        StepId::Activities,
        StepId::Documents,
        StepId::Review,
    ];

    /// Number of steps that must be complete before submission
    pub const TOTAL_REQUIRED: usize = 7;

    /// 1-based position in the wizard
    pub fn index(self) -> u8 {
        match self {
            StepId::PersonalInfo => 1,
            StepId::Address => 2,
            StepId::Education => 3,
            StepId::Family => 4,
            StepId::Financial => 5,
            StepId::Activities => 6,
            StepId::Documents => 7,
            StepId::Review => 8,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|step| step.index() == index)
    }

    /// Path segment used by the section endpoints
    pub fn slug(self) -> &'static str {
        match self {
            StepId::PersonalInfo => "personal-info",
            StepId::Address => "addresses",
            StepId::Education => "education",
            StepId::Family => "family",
            StepId::Financial => "financial",
            StepId::Activities => "activities",
            StepId::Documents => "documents",
            StepId::Review => "review",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StepId::PersonalInfo => "Personal Information",
            StepId::Address => "Address",
            StepId::Education => "Education",
            StepId::Family => "Family",
            StepId::Financial => "Financial Information",
            StepId::Activities => "Activities & References",
            StepId::Documents => "Documents",
            StepId::Review => "Review & Submit",
        }
    }

    /// Whether the step counts toward submission readiness
    pub fn is_required(self) -> bool {
        self != StepId::Review
    }

    /// Whether the step is backed by a form section
    pub fn has_form(self) -> bool {
        !matches!(self, StepId::Documents | StepId::Review)
    }

    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for StepId {
    type Err = PortalError;

    /// Accepts the slug (`personal-info`), the snake name (`personal_info`)
    /// or the 1-based index (`1`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");

        if let Ok(index) = normalized.parse::<u8>() {
            return Self::from_index(index).ok_or_else(|| PortalError::UnknownStep(s.to_string()));
        }

        let aliased = match normalized.as_str() {
            "personal" => "personal-info",
            "address" => "addresses",
            "activities-references" | "references" => "activities",
            other => other,
        };

        Self::ALL
            .iter()
            .copied()
            .find(|step| step.slug() == aliased)
            .ok_or_else(|| PortalError::UnknownStep(s.to_string()))
    }
}
