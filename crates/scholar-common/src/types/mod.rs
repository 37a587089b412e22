//! Common types used across the scholarship portal client

mod application;
mod document;
mod ids;
mod role;
mod step;

pub use application::{ApplicationDraft, ApplicationStatus};
pub use document::{mime_for_extension, DocumentKind, DocumentRequirement, MIB};
pub use ids::{ApplicationId, BookingId, DocumentId, NotificationId, ScholarshipId, SlotId, UserId};
pub use role::{Capability, Role};
pub use step::StepId;
