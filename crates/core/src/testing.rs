use crate::validate::CaseDraft;
use crate::{CaseId, CaseSummary, Gender, PatientCase, RiskLevel, RiskWord, SummaryMetadata};
use chrono::{DateTime, TimeZone, Utc};

/// Persisted case with a deterministic title and no timestamps.
pub fn case(id: &str) -> PatientCase {
    PatientCase {
        id: CaseId::new(id),
        case_title: format!("Case {id}"),
        patient_age: "54".to_string(),
        gender: Gender::Female,
        clinical_notes: format!("Clinical notes for {id}"),
        created_at: None,
        updated_at: None,
        summary: None,
    }
}

/// Case created `secs` seconds after the epoch, for ordering tests.
pub fn case_created(id: &str, secs: i64) -> PatientCase {
    PatientCase {
        created_at: Some(at(secs)),
        updated_at: Some(at(secs)),
        ..case(id)
    }
}

/// Case with a custom title.
pub fn case_titled(id: &str, title: &str) -> PatientCase {
    PatientCase {
        case_title: title.to_string(),
        ..case(id)
    }
}

/// Summary with the given confidence and `(word, level)` risk words.
pub fn summary(confidence: Option<u8>, risk_words: &[(&str, RiskLevel)]) -> CaseSummary {
    CaseSummary {
        chief_complaint: "Fever and hypotension".to_string(),
        key_findings: "Lactate 4.1 mmol/L".to_string(),
        assessment: "Suspected sepsis".to_string(),
        icd_codes: "A41.9".to_string(),
        recommendations: vec![
            "Start broad-spectrum antibiotics".to_string(),
            "Obtain blood cultures".to_string(),
        ],
        risk_words: risk_words
            .iter()
            .map(|(word, level)| RiskWord::new(*word, *level))
            .collect(),
        risk_factors: vec!["Immunosuppression".to_string()],
        confidence_score: confidence,
        metadata: Some(SummaryMetadata {
            processed_at: Some(at(1_700_000_000)),
            processing_time_ms: Some(120),
            model_version: Some("1.0.0".to_string()),
        }),
    }
}

/// A complete, valid intake draft.
pub fn draft() -> CaseDraft {
    CaseDraft {
        case_title: "Acute Chest Pain - 65-year-old Male".to_string(),
        patient_age: "65".to_string(),
        gender: "Male".to_string(),
        clinical_notes: "Chief Complaint: substernal chest pain for 2 hours.".to_string(),
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}
