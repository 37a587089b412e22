//! Step 6: activities, references and the applicant statement

use super::{validate_rows, FieldErrors, Validate};
use crate::validation::{
    validate_at_least_one, validate_optional_email, validate_phone, validate_required,
    validate_text,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const STATEMENT_MAX: usize = 3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub description: String,
}

impl Activity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role: String::new(),
            year: None,
            description: String::new(),
        }
    }
}

impl Validate for Activity {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_required(&self.name));
        errors
    }
}

/// Someone who can vouch for the applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl Reference {
    pub fn new(
        name: impl Into<String>,
        relationship: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            relationship: relationship.into(),
            phone: phone.into(),
            email: String::new(),
        }
    }
}

impl Validate for Reference {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_required(&self.name));
        errors.check("relationship", validate_required(&self.relationship));
        errors.check("phone", validate_phone(&self.phone));
        errors.check("email", validate_optional_email(&self.email));
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitiesInfo {
    pub activities: Vec<Activity>,
    pub references: Vec<Reference>,
    /// Why the applicant is asking for the scholarship
    pub statement: String,
}

impl Validate for ActivitiesInfo {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("statement", validate_text(&self.statement, STATEMENT_MAX));
        errors.check("references", validate_at_least_one(&self.references, "reference"));
        validate_rows(&mut errors, "activities", &self.activities);
        validate_rows(&mut errors, "references", &self.references);
        errors
    }
}
