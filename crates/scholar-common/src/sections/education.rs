//! Step 3: current enrolment and education history

use super::{validate_rows, FieldErrors, Validate};
use crate::validation::{validate_gpa, validate_optional_gpa, validate_required};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A previously completed level of education
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub graduation_year: Option<i32>,
    #[serde(default)]
    pub gpa: Option<f64>,
}

impl EducationRecord {
    pub fn new(level: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level: level.into(),
            institution: institution.into(),
            graduation_year: None,
            gpa: None,
        }
    }
}

impl Validate for EducationRecord {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("level", validate_required(&self.level));
        errors.check("institution", validate_required(&self.institution));
        errors.check("gpa", validate_optional_gpa(self.gpa));
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationInfo {
    /// Select: high school, vocational, bachelor, ...
    pub current_level: String,
    pub institution: String,
    pub faculty: String,
    pub major: String,
    pub year_of_study: Option<u8>,
    pub gpa: Option<f64>,
    pub history: Vec<EducationRecord>,
}

impl Validate for EducationInfo {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("current_level", validate_required(&self.current_level));
        errors.check("institution", validate_required(&self.institution));
        errors.check("gpa", validate_gpa(self.gpa));
        validate_rows(&mut errors, "history", &self.history);
        errors
    }
}
