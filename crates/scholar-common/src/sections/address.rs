//! Step 2: current and permanent address

use super::{FieldErrors, Validate};
use crate::validation::{validate_postal_code, validate_required};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub house_number: String,
    pub village: String,
    pub road: String,
    pub subdistrict: String,
    pub district: String,
    pub province: String,
    pub postal_code: String,
}

impl Address {
    /// Single-line rendering for the review page
    pub fn one_line(&self) -> String {
        [
            &self.house_number,
            &self.village,
            &self.road,
            &self.subdistrict,
            &self.district,
            &self.province,
            &self.postal_code,
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

impl Validate for Address {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("house_number", validate_required(&self.house_number));
        errors.check("subdistrict", validate_required(&self.subdistrict));
        errors.check("district", validate_required(&self.district));
        errors.check("province", validate_required(&self.province));
        errors.check("postal_code", validate_postal_code(&self.postal_code));
        errors
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressInfo {
    pub current: Address,
    /// When set, `permanent` is ignored and treated as equal to `current`
    pub same_as_current: bool,
    pub permanent: Address,
}

impl AddressInfo {
    pub fn permanent_address(&self) -> &Address {
        if self.same_as_current {
            &self.current
        } else {
            &self.permanent
        }
    }
}

impl Validate for AddressInfo {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.nest("current", self.current.validate());
        if !self.same_as_current {
            errors.nest("permanent", self.permanent.validate());
        }
        errors
    }
}
