use clinicase_core::validate::{validate_draft, CaseDraft, ValidationError, MAX_NOTES_CHARS};
use clinicase_core::{NewCase, PatientCase};

/// Intake form fields, for per-field edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeField {
    Title,
    Age,
    Gender,
    Notes,
}

/// New-case form state. User input is only cleared by a successful submit
/// or an explicit [`reset`](Self::reset).
#[derive(Debug, Clone, Default)]
pub struct IntakeController {
    draft: CaseDraft,
    violations: Vec<ValidationError>,
    error: Option<String>,
    submitting: bool,
    success: bool,
}

impl IntakeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &CaseDraft {
        &self.draft
    }

    /// Edit one field. Any shown error goes away, as the form re-validates
    /// on the next submit.
    pub fn set_field(&mut self, field: IntakeField, value: impl Into<String>) {
        let value = value.into();
        match field {
            IntakeField::Title => self.draft.case_title = value,
            IntakeField::Age => self.draft.patient_age = value,
            IntakeField::Gender => self.draft.gender = value,
            IntakeField::Notes => self.draft.clinical_notes = value,
        }
        self.error = None;
        self.violations.clear();
    }

    /// Replace the whole draft (e.g. from CLI flags), clearing errors.
    pub fn fill(&mut self, draft: CaseDraft) {
        self.draft = draft;
        self.error = None;
        self.violations.clear();
    }

    /// Start a submit. Returns the validated case to send, or `None` when
    /// validation failed or a submit is already in flight.
    pub fn submit(&mut self) -> Option<NewCase> {
        if self.submitting {
            return None;
        }
        self.success = false;
        match validate_draft(&self.draft) {
            Ok(case) => {
                self.violations.clear();
                self.error = None;
                self.submitting = true;
                Some(case)
            }
            Err(violations) => {
                self.error = Some(violation_message(&violations));
                self.violations = violations;
                None
            }
        }
    }

    /// Apply the create result. Returns true on success, when the caller
    /// should refresh the listing and schedule the redirect.
    pub fn finish_submit(&mut self, result: Result<PatientCase, String>) -> bool {
        self.submitting = false;
        match result {
            Ok(_) => {
                self.draft = CaseDraft::default();
                self.violations.clear();
                self.error = None;
                self.success = true;
                true
            }
            Err(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    /// "Clear Form".
    pub fn reset(&mut self) {
        self.draft = CaseDraft::default();
        self.violations.clear();
        self.error = None;
        self.success = false;
    }

    /// The success banner has been shown long enough.
    pub fn acknowledge_success(&mut self) {
        self.success = false;
    }

    /// Forget an outstanding submit whose result will never arrive.
    pub fn abandon_in_flight(&mut self) {
        self.submitting = false;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn succeeded(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn violations(&self) -> &[ValidationError] {
        &self.violations
    }

    /// Characters typed into the notes field, for the `n / 10000` counter.
    pub fn notes_len(&self) -> usize {
        self.draft.clinical_notes.chars().count()
    }

    pub fn notes_limit(&self) -> usize {
        MAX_NOTES_CHARS
    }
}

fn violation_message(violations: &[ValidationError]) -> String {
    let only_missing = violations
        .iter()
        .all(|v| matches!(v, ValidationError::MissingField { .. }));
    if only_missing {
        return "All fields are required".to_string();
    }
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
