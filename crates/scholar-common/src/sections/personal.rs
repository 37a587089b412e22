//! Step 1: personal information

use super::{FieldErrors, Validate};
use crate::validation::{
    validate_citizen_id, validate_email, validate_past_date, validate_phone, validate_required,
    validate_text,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

const NAME_MAX: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    /// Name prefix (Mr., Ms., ...)
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub citizen_id: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    pub gender: String,
    pub nationality: String,
    pub religion: String,
    pub phone: String,
    pub email: String,
}

impl PersonalInfo {
    /// Validate against a fixed date so birth dates can be checked
    /// deterministically
    pub fn validate_as_of(&self, today: NaiveDate) -> FieldErrors {
        let mut errors = FieldErrors::new();

        errors.check("title", validate_required(&self.title));
        errors.check("first_name", validate_text(&self.first_name, NAME_MAX));
        errors.check("last_name", validate_text(&self.last_name, NAME_MAX));
        errors.check("citizen_id", validate_citizen_id(&self.citizen_id));
        errors.check("birth_date", validate_past_date(&self.birth_date, today));
        errors.check("gender", validate_required(&self.gender));
        errors.check("nationality", validate_required(&self.nationality));
        errors.check("phone", validate_phone(&self.phone));
        errors.check("email", validate_email(&self.email));

        errors
    }

    pub fn full_name(&self) -> String {
        [self.title.as_str(), self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Validate for PersonalInfo {
    fn validate(&self) -> FieldErrors {
        self.validate_as_of(Utc::now().date_naive())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn valid() -> PersonalInfo {
        PersonalInfo {
            title: "Mr.".to_string(),
            first_name: "Somchai".to_string(),
            last_name: "Jaidee".to_string(),
            citizen_id: "1103700012345".to_string(),
            birth_date: "2005-02-14".to_string(),
            gender: "male".to_string(),
            nationality: "Thai".to_string(),
            religion: String::new(),
            phone: "0812345678".to_string(),
            email: "somchai@example.ac.th".to_string(),
        }
    }

    #[test]
    fn test_valid_personal_info() {
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn test_every_required_field_reported() {
        let errors = PersonalInfo::default().validate();
        for field in [
            "title",
            "first_name",
            "last_name",
            "citizen_id",
            "birth_date",
            "gender",
            "nationality",
            "phone",
            "email",
        ] {
            assert_eq!(errors.get(field), Some("This field is required"), "{}", field);
        }
        assert!(!errors.contains("religion"));
    }

    #[test]
    fn test_format_errors() {
        let mut info = valid();
        info.citizen_id = "12345".to_string();
        info.phone = "081-234-5678".to_string();

        let errors = info.validate();
        assert_eq!(errors.get("citizen_id"), Some("Must be exactly 13 digits"));
        assert_eq!(errors.get("phone"), Some("Must contain digits only"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_future_birth_date() {
        let mut info = valid();
        info.birth_date = "2030-01-01".to_string();
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(info.validate_as_of(today).contains("birth_date"));
    }

    #[test]
    fn test_full_name() {
        assert_eq!(valid().full_name(), "Mr. Somchai Jaidee");
    }
}
