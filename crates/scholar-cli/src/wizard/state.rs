use scholar_common::FieldErrors;

/// Where a single step stands
///
/// ```text
/// empty → editing → validating → invalid → editing
///                              → saving → save_failed → editing
///                                       → complete
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StepState {
    #[default]
    Empty,
    Editing,
    Validating,
    Invalid(FieldErrors),
    Saving,
    SaveFailed(String),
    Complete,
}

impl StepState {
    pub fn label(&self) -> &'static str {
        match self {
            StepState::Empty => "not started",
            StepState::Editing => "in progress",
            StepState::Validating => "validating",
            StepState::Invalid(_) => "needs attention",
            StepState::Saving => "saving",
            StepState::SaveFailed(_) => "save failed",
            StepState::Complete => "complete",
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            StepState::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
