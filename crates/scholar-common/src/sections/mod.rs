//! Wizard section payloads
//!
//! Each form step owns one payload type. [`SectionData`] is the tagged union
//! of all of them, keyed by [`StepId`], so the wizard, the draft aggregate
//! and the API client all pass the same shape around.
//!
//! Validation is synchronous and returns a [`FieldErrors`] map from field
//! path (`current.postal_code`, `assets[1].estimated_value`) to message.
//! An empty map means the section may be saved.

mod activities;
mod address;
mod education;
mod family;
mod financial;
mod personal;

pub use activities::{ActivitiesInfo, Activity, Reference};
pub use address::{Address, AddressInfo};
pub use education::{EducationInfo, EducationRecord};
pub use family::{FamilyInfo, FamilyMember, Sibling};
pub use financial::{Asset, FinancialInfo};
pub use personal::PersonalInfo;

use crate::error::PortalError;
use crate::types::StepId;
use crate::validation::FieldValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-field validation messages for one section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one rule; `Ok` leaves the map untouched
    pub fn check(&mut self, field: impl Into<String>, result: Result<(), FieldValidationError>) {
        if let Err(err) = result {
            self.insert(field, err.to_string());
        }
    }

    /// Keep the first message reported for a field
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// Merge errors of a nested record under `prefix.`
    pub fn nest(&mut self, prefix: &str, nested: FieldErrors) {
        for (field, message) in nested.0 {
            self.insert(format!("{}.{}", prefix, field), message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Synchronous field validation for a form payload
pub trait Validate {
    fn validate(&self) -> FieldErrors;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Validate every row of a repeatable list under `name[i].`
pub(crate) fn validate_rows<T: Validate>(errors: &mut FieldErrors, name: &str, rows: &[T]) {
    for (i, row) in rows.iter().enumerate() {
        errors.nest(&format!("{}[{}]", name, i), row.validate());
    }
}

/// Data of one form step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", content = "data", rename_all = "snake_case")]
pub enum SectionData {
    PersonalInfo(PersonalInfo),
    Address(AddressInfo),
    Education(EducationInfo),
    Family(FamilyInfo),
    Financial(FinancialInfo),
    Activities(ActivitiesInfo),
}

impl SectionData {
    pub fn step(&self) -> StepId {
        match self {
            SectionData::PersonalInfo(_) => StepId::PersonalInfo,
            SectionData::Address(_) => StepId::Address,
            SectionData::Education(_) => StepId::Education,
            SectionData::Family(_) => StepId::Family,
            SectionData::Financial(_) => StepId::Financial,
            SectionData::Activities(_) => StepId::Activities,
        }
    }

    /// Parse the bare payload of `step` (the `data` part, without the tag)
    pub fn from_payload(step: StepId, payload: serde_json::Value) -> crate::Result<Self> {
        let section = match step {
            StepId::PersonalInfo => SectionData::PersonalInfo(serde_json::from_value(payload)?),
            StepId::Address => SectionData::Address(serde_json::from_value(payload)?),
            StepId::Education => SectionData::Education(serde_json::from_value(payload)?),
            StepId::Family => SectionData::Family(serde_json::from_value(payload)?),
            StepId::Financial => SectionData::Financial(serde_json::from_value(payload)?),
            StepId::Activities => SectionData::Activities(serde_json::from_value(payload)?),
            StepId::Documents | StepId::Review => {
                return Err(PortalError::NotAForm {
                    step: step.to_string(),
                })
            }
        };
        Ok(section)
    }

    /// The bare payload, as sent to the section endpoint
    pub fn payload(&self) -> crate::Result<serde_json::Value> {
        let value = match self {
            SectionData::PersonalInfo(data) => serde_json::to_value(data)?,
            SectionData::Address(data) => serde_json::to_value(data)?,
            SectionData::Education(data) => serde_json::to_value(data)?,
            SectionData::Family(data) => serde_json::to_value(data)?,
            SectionData::Financial(data) => serde_json::to_value(data)?,
            SectionData::Activities(data) => serde_json::to_value(data)?,
        };
        Ok(value)
    }
}

impl Validate for SectionData {
    fn validate(&self) -> FieldErrors {
        match self {
            SectionData::PersonalInfo(data) => data.validate(),
            SectionData::Address(data) => data.validate(),
            SectionData::Education(data) => data.validate(),
            SectionData::Family(data) => data.validate(),
            SectionData::Financial(data) => data.validate(),
            SectionData::Activities(data) => data.validate(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.check("phone", Err(FieldValidationError::Required));
        errors.check("phone", Err(FieldValidationError::DigitsOnly));
        errors.check("email", Ok(()));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("phone"), Some("This field is required"));
        assert!(!errors.contains("email"));
    }

    #[test]
    fn test_field_errors_nest() {
        let mut inner = FieldErrors::new();
        inner.insert("postal_code", "Must be exactly 5 digits");

        let mut outer = FieldErrors::new();
        outer.nest("current", inner);

        assert!(outer.contains("current.postal_code"));
        assert_eq!(outer.to_string(), "current.postal_code: Must be exactly 5 digits");
    }

    #[test]
    fn test_section_tagged_by_step() {
        let section = SectionData::Financial(FinancialInfo::default());
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["step"], "financial");
        assert!(json["data"].is_object());
        assert_eq!(section.step(), StepId::Financial);
    }

    #[test]
    fn test_from_payload() {
        let section = SectionData::from_payload(
            StepId::Address,
            json!({"current": {"house_number": "99/1", "province": "Bangkok"}}),
        )
        .unwrap();
        assert_eq!(section.step(), StepId::Address);

        let err = SectionData::from_payload(StepId::Documents, json!({})).unwrap_err();
        assert!(matches!(err, PortalError::NotAForm { .. }));
    }
}
