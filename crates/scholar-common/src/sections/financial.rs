//! Step 5: household finances
//!
//! `income_per_member` is derived from `family_income` and
//! `family_member_count`. It has no setter, and any value arriving from the
//! backend or a file is discarded and recomputed.

use super::{validate_rows, FieldErrors, Validate};
use crate::validation::{validate_amount, validate_min_count, validate_required};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Land, vehicle, savings, ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub asset_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_value: f64,
}

impl Asset {
    pub fn new(asset_type: impl Into<String>, estimated_value: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_type: asset_type.into(),
            description: String::new(),
            estimated_value,
        }
    }
}

impl Validate for Asset {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("asset_type", validate_required(&self.asset_type));
        errors.check("estimated_value", validate_amount(self.estimated_value));
        errors
    }
}

/// Input shape; `income_per_member` is never read from it
#[derive(Deserialize)]
#[serde(default)]
struct FinancialInfoFields {
    family_income: f64,
    family_member_count: u32,
    income_source: String,
    has_debt: bool,
    debt_amount: f64,
    assets: Vec<Asset>,
}

impl Default for FinancialInfoFields {
    fn default() -> Self {
        Self {
            family_income: 0.0,
            family_member_count: 1,
            income_source: String::new(),
            has_debt: false,
            debt_amount: 0.0,
            assets: Vec::new(),
        }
    }
}

impl From<FinancialInfoFields> for FinancialInfo {
    fn from(fields: FinancialInfoFields) -> Self {
        let mut info = FinancialInfo {
            family_income: fields.family_income,
            family_member_count: fields.family_member_count,
            income_per_member: 0.0,
            income_source: fields.income_source,
            has_debt: fields.has_debt,
            debt_amount: fields.debt_amount,
            assets: fields.assets,
        };
        info.recompute();
        info
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FinancialInfoFields")]
pub struct FinancialInfo {
    /// Monthly household income
    family_income: f64,
    family_member_count: u32,
    income_per_member: f64,
    /// Select: salary, agriculture, business, ...
    pub income_source: String,
    pub has_debt: bool,
    pub debt_amount: f64,
    pub assets: Vec<Asset>,
}

impl Default for FinancialInfo {
    fn default() -> Self {
        FinancialInfoFields::default().into()
    }
}

impl FinancialInfo {
    pub fn new(family_income: f64, family_member_count: u32) -> Self {
        let mut info = Self::default();
        info.family_income = family_income;
        info.family_member_count = family_member_count;
        info.recompute();
        info
    }

    pub fn family_income(&self) -> f64 {
        self.family_income
    }

    pub fn family_member_count(&self) -> u32 {
        self.family_member_count
    }

    /// `family_income / max(family_member_count, 1)`, rounded to cents
    pub fn income_per_member(&self) -> f64 {
        self.income_per_member
    }

    pub fn set_family_income(&mut self, family_income: f64) {
        self.family_income = family_income;
        self.recompute();
    }

    pub fn set_family_member_count(&mut self, family_member_count: u32) {
        self.family_member_count = family_member_count;
        self.recompute();
    }

    pub fn total_assets(&self) -> f64 {
        self.assets.iter().map(|a| a.estimated_value).sum()
    }

    fn recompute(&mut self) {
        let members = f64::from(self.family_member_count.max(1));
        self.income_per_member = (self.family_income / members * 100.0).round() / 100.0;
    }
}

impl Validate for FinancialInfo {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check("family_income", validate_amount(self.family_income));
        errors.check(
            "family_member_count",
            validate_min_count(self.family_member_count, 1),
        );
        errors.check("income_source", validate_required(&self.income_source));
        if self.has_debt {
            errors.check("debt_amount", validate_amount(self.debt_amount));
        }
        validate_rows(&mut errors, "assets", &self.assets);
        errors
    }
}
