//! Field validation rules
//!
//! Every wizard section is checked with the same small set of rules so the
//! inline messages read the same on every step.
//!
//! # Examples
//!
//! ```rust
//! use scholar_common::validation::{validate_citizen_id, validate_phone, FieldValidationError};
//!
//! assert!(validate_citizen_id("1103700012345").is_ok());
//! assert_eq!(validate_phone("08-1234-567"), Err(FieldValidationError::DigitsOnly));
//! ```

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Length of a national citizen id
pub const CITIZEN_ID_LENGTH: usize = 13;

/// Length of a mobile phone number
pub const PHONE_LENGTH: usize = 10;

/// Length of a postal code
pub const POSTAL_CODE_LENGTH: usize = 5;

/// Highest grade point average on the 4-point scale
pub const MAX_GPA: f64 = 4.0;

/// Errors reported for a single form field
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FieldValidationError {
    #[error("This field is required")]
    Required,

    #[error("Must contain digits only")]
    DigitsOnly,

    #[error("Must be exactly {expected} digits")]
    Length { expected: usize },

    #[error("Must be at most {max} characters")]
    TooLong { max: usize },

    #[error("Invalid email address")]
    Email,

    #[error("Must be between {min} and {max}")]
    OutOfRange { min: f64, max: f64 },

    #[error("Must not be negative")]
    Negative,

    #[error("Must be at least {min}")]
    BelowMinimum { min: u32 },

    #[error("Invalid date, expected YYYY-MM-DD")]
    DateFormat,

    #[error("Date cannot be in the future")]
    FutureDate,

    #[error("At least one {0} is required")]
    AtLeastOne(String),
}

/// Require a non-blank text value or select choice
pub fn validate_required(value: &str) -> Result<(), FieldValidationError> {
    if value.trim().is_empty() {
        return Err(FieldValidationError::Required);
    }
    Ok(())
}

/// Require a non-blank value no longer than `max` characters
pub fn validate_text(value: &str, max: usize) -> Result<(), FieldValidationError> {
    validate_required(value)?;
    if value.chars().count() > max {
        return Err(FieldValidationError::TooLong { max });
    }
    Ok(())
}

/// Require exactly `length` ASCII digits
pub fn validate_digits(value: &str, length: usize) -> Result<(), FieldValidationError> {
    let value = value.trim();
    validate_required(value)?;

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldValidationError::DigitsOnly);
    }

    if value.len() != length {
        return Err(FieldValidationError::Length { expected: length });
    }

    Ok(())
}

/// Citizen id: digits only, length 13
pub fn validate_citizen_id(value: &str) -> Result<(), FieldValidationError> {
    validate_digits(value, CITIZEN_ID_LENGTH)
}

/// Phone number: digits only, length 10
pub fn validate_phone(value: &str) -> Result<(), FieldValidationError> {
    validate_digits(value, PHONE_LENGTH)
}

/// Phone number that may be left blank
pub fn validate_optional_phone(value: &str) -> Result<(), FieldValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_phone(value)
}

/// Postal code: digits only, length 5
pub fn validate_postal_code(value: &str) -> Result<(), FieldValidationError> {
    validate_digits(value, POSTAL_CODE_LENGTH)
}

#[allow(clippy::expect_used)]
fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
}

/// Email address in `local@domain.tld` shape
pub fn validate_email(value: &str) -> Result<(), FieldValidationError> {
    let value = value.trim();
    validate_required(value)?;
    if !email_regex().is_match(value) {
        return Err(FieldValidationError::Email);
    }
    Ok(())
}

/// Email address that may be left blank
pub fn validate_optional_email(value: &str) -> Result<(), FieldValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    validate_email(value)
}

/// Grade point average on the 0.00 - 4.00 scale
pub fn validate_gpa(value: Option<f64>) -> Result<(), FieldValidationError> {
    let gpa = value.ok_or(FieldValidationError::Required)?;
    validate_optional_gpa(Some(gpa))
}

/// Grade point average that may be omitted
pub fn validate_optional_gpa(value: Option<f64>) -> Result<(), FieldValidationError> {
    match value {
        Some(gpa) if !gpa.is_finite() || !(0.0..=MAX_GPA).contains(&gpa) => {
            Err(FieldValidationError::OutOfRange {
                min: 0.0,
                max: MAX_GPA,
            })
        }
        _ => Ok(()),
    }
}

/// Money amount that must be zero or more
pub fn validate_amount(value: f64) -> Result<(), FieldValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(FieldValidationError::Negative);
    }
    Ok(())
}

/// Count that must be at least `min`
pub fn validate_min_count(value: u32, min: u32) -> Result<(), FieldValidationError> {
    if value < min {
        return Err(FieldValidationError::BelowMinimum { min });
    }
    Ok(())
}

/// ISO date (`YYYY-MM-DD`) that is not after `today`
pub fn validate_past_date(value: &str, today: NaiveDate) -> Result<(), FieldValidationError> {
    validate_required(value)?;
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| FieldValidationError::DateFormat)?;
    if date > today {
        return Err(FieldValidationError::FutureDate);
    }
    Ok(())
}

/// Non-empty list requirement for repeatable rows
pub fn validate_at_least_one<T>(rows: &[T], what: &str) -> Result<(), FieldValidationError> {
    if rows.is_empty() {
        return Err(FieldValidationError::AtLeastOne(what.to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Somchai").is_ok());
        assert_eq!(validate_required(""), Err(FieldValidationError::Required));
        assert_eq!(validate_required("   "), Err(FieldValidationError::Required));
    }

    #[test]
    fn test_validate_citizen_id() {
        assert!(validate_citizen_id("1103700012345").is_ok());
        assert_eq!(validate_citizen_id(""), Err(FieldValidationError::Required));
        assert_eq!(
            validate_citizen_id("1-1037-00012-34-5"),
            Err(FieldValidationError::DigitsOnly)
        );
        assert_eq!(
            validate_citizen_id("110370001234"),
            Err(FieldValidationError::Length { expected: 13 })
        );
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0812345678").is_ok());
        assert_eq!(validate_phone("081234567"), Err(FieldValidationError::Length { expected: 10 }));
        assert_eq!(validate_phone("+66812345678"), Err(FieldValidationError::DigitsOnly));
        assert!(validate_optional_phone("").is_ok());
        assert!(validate_optional_phone("12").is_err());
    }

    #[test]
    fn test_validate_postal_code() {
        assert!(validate_postal_code("10330").is_ok());
        assert!(validate_postal_code("1033").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("student@example.ac.th").is_ok());
        assert_eq!(validate_email("student@"), Err(FieldValidationError::Email));
        assert_eq!(validate_email("no at sign.com"), Err(FieldValidationError::Email));
        assert!(validate_optional_email("").is_ok());
    }

    #[test]
    fn test_validate_gpa() {
        assert!(validate_gpa(Some(3.75)).is_ok());
        assert!(validate_gpa(Some(0.0)).is_ok());
        assert!(validate_gpa(Some(4.0)).is_ok());
        assert_eq!(validate_gpa(None), Err(FieldValidationError::Required));
        assert!(validate_gpa(Some(4.01)).is_err());
        assert!(validate_gpa(Some(-0.5)).is_err());
        assert!(validate_optional_gpa(None).is_ok());
    }

    #[test]
    fn test_validate_amount_and_count() {
        assert!(validate_amount(0.0).is_ok());
        assert!(validate_amount(15_000.5).is_ok());
        assert_eq!(validate_amount(-1.0), Err(FieldValidationError::Negative));
        assert_eq!(validate_amount(f64::NAN), Err(FieldValidationError::Negative));
        assert!(validate_min_count(1, 1).is_ok());
        assert_eq!(validate_min_count(0, 1), Err(FieldValidationError::BelowMinimum { min: 1 }));
    }

    #[test]
    fn test_validate_past_date() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert!(validate_past_date("2005-02-14", today).is_ok());
        assert!(validate_past_date("2026-06-01", today).is_ok());
        assert_eq!(validate_past_date("2026-06-02", today), Err(FieldValidationError::FutureDate));
        assert_eq!(validate_past_date("14/02/2005", today), Err(FieldValidationError::DateFormat));
    }

    #[test]
    fn test_validate_text_length() {
        assert!(validate_text("ok", 10).is_ok());
        assert_eq!(validate_text("abcdef", 5), Err(FieldValidationError::TooLong { max: 5 }));
    }

    proptest! {
        #[test]
        fn prop_any_ten_digit_string_is_a_phone(digits in "[0-9]{10}") {
            prop_assert!(validate_phone(&digits).is_ok());
        }

        #[test]
        fn prop_non_digit_citizen_ids_rejected(id in "[0-9]{6}[a-z][0-9]{6}") {
            prop_assert_eq!(validate_citizen_id(&id), Err(FieldValidationError::DigitsOnly));
        }
    }
}
