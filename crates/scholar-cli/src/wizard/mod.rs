//! Multi-step application wizard
//!
//! The controller owns the draft aggregate and enforces step ordering,
//! validation before save and the submission lock. Persistence goes
//! through [`DraftStore`] so the flow can run against the HTTP client or
//! an in-memory store.

pub mod controller;
pub mod state;
pub mod store;

pub use controller::{run_autosave, WizardController};
pub use state::StepState;
pub use store::DraftStore;
