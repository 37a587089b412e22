//! Step 4: parents, guardians and siblings

use super::{validate_rows, FieldErrors, Validate};
use crate::validation::{
    validate_amount, validate_at_least_one, validate_optional_phone, validate_required,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Father, mother or guardian
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// father, mother, guardian
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub occupation: String,
    /// Monthly income
    #[serde(default)]
    pub monthly_income: f64,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_alive")]
    pub is_alive: bool,
}

fn default_alive() -> bool {
    true
}

impl FamilyMember {
    pub fn new(
        relation: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            relation: relation.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            occupation: String::new(),
            monthly_income: 0.0,
            phone: String::new(),
            is_alive: true,
        }
    }
}

impl Validate for FamilyMember {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("relation", validate_required(&self.relation));
        errors.check("first_name", validate_required(&self.first_name));
        errors.check("last_name", validate_required(&self.last_name));
        errors.check("monthly_income", validate_amount(self.monthly_income));
        errors.check("phone", validate_optional_phone(&self.phone));
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sibling {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u8>,
    /// Education level or occupation
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_studying: bool,
}

impl Sibling {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            age: None,
            status: String::new(),
            is_studying: false,
        }
    }
}

impl Validate for Sibling {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("name", validate_required(&self.name));
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyInfo {
    /// Select: married, divorced, separated, widowed, ...
    pub parents_status: String,
    /// At least one parent or guardian
    pub members: Vec<FamilyMember>,
    pub siblings: Vec<Sibling>,
}

impl FamilyInfo {
    /// Combined monthly income of all listed members
    pub fn total_member_income(&self) -> f64 {
        self.members.iter().map(|m| m.monthly_income).sum()
    }
}

impl Validate for FamilyInfo {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("parents_status", validate_required(&self.parents_status));
        errors.check("members", validate_at_least_one(&self.members, "parent or guardian"));
        validate_rows(&mut errors, "members", &self.members);
        validate_rows(&mut errors, "siblings", &self.siblings);
        errors
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_one_member() {
        let info = FamilyInfo {
            parents_status: "married".to_string(),
            ..Default::default()
        };
        assert_eq!(
            info.validate().get("members"),
            Some("At least one parent or guardian is required")
        );
    }

    #[test]
    fn test_siblings_are_optional() {
        let info = FamilyInfo {
            parents_status: "married".to_string(),
            members: vec![FamilyMember::new("mother", "Malee", "Jaidee")],
            siblings: vec![],
        };
        assert!(info.validate().is_empty());
    }

    #[test]
    fn test_member_rows_validated() {
        let mut father = FamilyMember::new("father", "", "Jaidee");
        father.monthly_income = -10.0;
        father.phone = "123".to_string();

        let info = FamilyInfo {
            parents_status: "married".to_string(),
            members: vec![father],
            siblings: vec![Sibling::new("")],
        };

        let errors = info.validate();
        assert!(errors.contains("members[0].first_name"));
        assert!(errors.contains("members[0].monthly_income"));
        assert!(errors.contains("members[0].phone"));
        assert!(errors.contains("siblings[0].name"));
    }

    #[test]
    fn test_member_defaults_alive() {
        let member: FamilyMember =
            serde_json::from_str(r#"{"relation": "guardian", "first_name": "A", "last_name": "B"}"#)
                .unwrap();
        assert!(member.is_alive);
    }

    #[test]
    fn test_total_member_income() {
        let mut father = FamilyMember::new("father", "Somsak", "Jaidee");
        father.monthly_income = 12_000.0;
        let mut mother = FamilyMember::new("mother", "Malee", "Jaidee");
        mother.monthly_income = 8_000.0;

        let info = FamilyInfo {
            parents_status: "married".to_string(),
            members: vec![father, mother],
            siblings: vec![],
        };
        assert_eq!(info.total_member_income(), 20_000.0);
    }
}
