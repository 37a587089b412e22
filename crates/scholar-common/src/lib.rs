//! Scholar Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared domain model, validation rules, and logging for the scholarship
//! portal client.
//!
//! # Overview
//!
//! - **Types**: identifiers, wizard steps, application drafts, roles and
//!   the document catalogue
//! - **Sections**: the per-step form payloads and their validation
//! - **Validation**: field-level rules shared by every section
//! - **Logging**: tracing subscriber setup used by the binaries
//!
//! # Example
//!
//! ```no_run
//! use scholar_common::sections::{FinancialInfo, Validate};
//!
//! let mut financial = FinancialInfo::default();
//! financial.set_family_income(20_000.0);
//! financial.set_family_member_count(4);
//! assert_eq!(financial.income_per_member(), 5_000.0);
//! assert!(financial.validate().contains("income_source"));
//! ```

pub mod error;
pub mod logging;
pub mod sections;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{PortalError, Result};
pub use sections::{FieldErrors, SectionData, Validate};
pub use types::{ApplicationDraft, ApplicationId, ApplicationStatus, ScholarshipId, StepId};
