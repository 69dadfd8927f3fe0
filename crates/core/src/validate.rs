use crate::case::{Gender, NewCase};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_NOTES_CHARS: usize = 10_000;
pub const MAX_PATIENT_AGE: u16 = 150;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("{field} exceeds {max} characters ({actual})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    #[error("patient age must be a whole number between 0 and {MAX_PATIENT_AGE}, got {value:?}")]
    InvalidAge { value: String },
    #[error("gender must be one of Male, Female, Other, got {value:?}")]
    InvalidGender { value: String },
}

/// Raw intake form values, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDraft {
    pub case_title: String,
    pub patient_age: String,
    pub gender: String,
    pub clinical_notes: String,
}

impl CaseDraft {
    pub fn is_blank(&self) -> bool {
        [
            &self.case_title,
            &self.patient_age,
            &self.gender,
            &self.clinical_notes,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }
}

/// Validate a draft by composing independent validators. On success the
/// draft is converted into a [`NewCase`] ready to submit.
pub fn validate_draft(draft: &CaseDraft) -> Result<NewCase, Vec<ValidationError>> {
    let validators: &[fn(&CaseDraft) -> Vec<ValidationError>] = &[
        validate_required_fields,
        validate_title,
        validate_age,
        validate_gender,
        validate_notes,
    ];

    let errors: Vec<ValidationError> = validators.iter().flat_map(|v| v(draft)).collect();
    if !errors.is_empty() {
        return Err(errors);
    }

    let gender = Gender::from_label(&draft.gender).ok_or_else(|| {
        vec![ValidationError::InvalidGender {
            value: draft.gender.clone(),
        }]
    })?;

    Ok(NewCase {
        case_title: draft.case_title.trim().to_string(),
        patient_age: draft.patient_age.trim().to_string(),
        gender,
        clinical_notes: draft.clinical_notes.clone(),
    })
}

fn validate_required_fields(draft: &CaseDraft) -> Vec<ValidationError> {
    [
        ("caseTitle", draft.case_title.trim().is_empty()),
        ("patientAge", draft.patient_age.trim().is_empty()),
        ("gender", draft.gender.trim().is_empty()),
        ("clinicalNotes", draft.clinical_notes.trim().is_empty()),
    ]
    .into_iter()
    .filter(|(_, empty)| *empty)
    .map(|(field, _)| ValidationError::MissingField { field })
    .collect()
}

fn validate_title(draft: &CaseDraft) -> Vec<ValidationError> {
    let actual = draft.case_title.trim().chars().count();
    if actual > MAX_TITLE_CHARS {
        vec![ValidationError::TooLong {
            field: "caseTitle",
            max: MAX_TITLE_CHARS,
            actual,
        }]
    } else {
        vec![]
    }
}

fn validate_age(draft: &CaseDraft) -> Vec<ValidationError> {
    let value = draft.patient_age.trim();
    if value.is_empty() {
        return vec![];
    }
    match value.parse::<u16>() {
        Ok(age) if age <= MAX_PATIENT_AGE => vec![],
        _ => vec![ValidationError::InvalidAge {
            value: value.to_string(),
        }],
    }
}

fn validate_gender(draft: &CaseDraft) -> Vec<ValidationError> {
    if draft.gender.trim().is_empty() || Gender::from_label(&draft.gender).is_some() {
        vec![]
    } else {
        vec![ValidationError::InvalidGender {
            value: draft.gender.clone(),
        }]
    }
}

fn validate_notes(draft: &CaseDraft) -> Vec<ValidationError> {
    let actual = draft.clinical_notes.chars().count();
    if actual > MAX_NOTES_CHARS {
        vec![ValidationError::TooLong {
            field: "clinicalNotes",
            max: MAX_NOTES_CHARS,
            actual,
        }]
    } else {
        vec![]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CaseDraft {
        CaseDraft {
            case_title: "Acute Chest Pain - 65-year-old Male".to_string(),
            patient_age: "65".to_string(),
            gender: "Male".to_string(),
            clinical_notes: "Chief Complaint: chest pain radiating to left arm.".to_string(),
        }
    }

    #[test]
    fn valid_draft_converts_to_new_case() {
        let new_case = validate_draft(&draft()).unwrap();
        assert_eq!(new_case.gender, Gender::Male);
        assert_eq!(new_case.patient_age, "65");
    }

    #[test]
    fn empty_notes_is_missing_field() {
        let mut d = draft();
        d.clinical_notes = "   ".to_string();
        let errors = validate_draft(&d).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingField {
                field: "clinicalNotes"
            }]
        );
    }

    #[test]
    fn all_missing_fields_are_reported() {
        let errors = validate_draft(&CaseDraft::default()).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::MissingField { .. })));
    }

    #[test]
    fn age_out_of_range_or_non_numeric_is_rejected() {
        for bad in ["151", "-1", "sixty", "6.5"] {
            let mut d = draft();
            d.patient_age = bad.to_string();
            let errors = validate_draft(&d).unwrap_err();
            assert!(
                matches!(errors.as_slice(), [ValidationError::InvalidAge { .. }]),
                "age {bad:?} produced {errors:?}"
            );
        }
        let mut d = draft();
        d.patient_age = "0".to_string();
        assert!(validate_draft(&d).is_ok());
        d.patient_age = "150".to_string();
        assert!(validate_draft(&d).is_ok());
    }

    #[test]
    fn overlong_title_and_notes_are_rejected() {
        let mut d = draft();
        d.case_title = "x".repeat(MAX_TITLE_CHARS + 1);
        d.clinical_notes = "y".repeat(MAX_NOTES_CHARS + 1);
        let errors = validate_draft(&d).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::TooLong { .. })));
    }

    #[test]
    fn unknown_gender_is_rejected() {
        let mut d = draft();
        d.gender = "robot".to_string();
        let errors = validate_draft(&d).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidGender { .. }]
        ));
    }

    #[test]
    fn blank_draft_detection() {
        assert!(CaseDraft::default().is_blank());
        assert!(!draft().is_blank());
    }
}
