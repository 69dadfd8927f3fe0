//! Wire types for the clinical case REST API (`/api/v1`).
//!
//! The backend's JSON is looser than the domain model: risk words arrive as
//! bare strings or `{word, level}` objects, summary extras may sit at the top
//! level of the case document, and timestamps may lack a zone. Everything is
//! normalized here into `clinicase-core` types so nothing deeper in the
//! client has to branch on shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use clinicase_core::{
    CaseId, CaseSummary, Gender, NewCase, PatientCase, RiskLevel, RiskWord, SummaryMetadata,
};

// ─── Paths ───────────────────────────────────────────────────────────────────

/// Collection path, relative to the `/api/v1` base.
pub const CASES_PATH: &str = "/cases";

pub fn case_path(id: &CaseId) -> String {
    format!("{CASES_PATH}/{}", urlencoding::encode(id.as_str()))
}

pub fn summarize_path(id: &CaseId) -> String {
    format!("{}/summarize", case_path(id))
}

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("case record has no id")]
    MissingId,
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Body of `POST /cases` and `PUT /cases/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaseUpsertRequest {
    pub case_title: String,
    pub patient_age: String,
    pub gender: String,
    pub clinical_notes: String,
}

impl From<&NewCase> for CaseUpsertRequest {
    fn from(case: &NewCase) -> Self {
        Self {
            case_title: case.case_title.clone(),
            patient_age: case.patient_age.clone(),
            gender: case.gender.as_str().to_string(),
            clinical_notes: case.clinical_notes.clone(),
        }
    }
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// A case document as returned by the backend.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub case_title: Option<String>,
    #[serde(default)]
    pub patient_age: Option<AgeValue>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub clinical_notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<SummaryRecord>,
    // Top-level summary extras, as the backend stores them.
    #[serde(default)]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default)]
    pub risk_words: Option<Vec<RiskWordRecord>>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub metadata: Option<MetadataRecord>,
}

/// `patientAge` is a string in the schema, but numbers show up too.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AgeValue {
    Text(String),
    Number(f64),
}

impl AgeValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
            Self::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub key_findings: Option<String>,
    #[serde(default)]
    pub assessment: Option<String>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default)]
    pub icd_codes: Option<String>,
    #[serde(default)]
    pub risk_words: Option<Vec<RiskWordRecord>>,
    #[serde(default)]
    pub risk_factors: Option<Vec<String>>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub metadata: Option<MetadataRecord>,
}

/// Risk entries come in two shapes; both normalize to [`RiskWord`].
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RiskWordRecord {
    Plain(String),
    Tagged {
        word: String,
        #[serde(default)]
        level: Option<String>,
    },
}

impl RiskWordRecord {
    pub fn normalize(self) -> RiskWord {
        match self {
            Self::Plain(word) => RiskWord::new(word, RiskLevel::High),
            Self::Tagged { word, level } => {
                let level = level
                    .as_deref()
                    .map(RiskLevel::from_label)
                    .unwrap_or_default();
                RiskWord::new(word, level)
            }
        }
    }
}

/// Free-form metadata map; only the known keys are kept.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub model_version: Option<String>,
}

impl MetadataRecord {
    fn normalize(self) -> SummaryMetadata {
        SummaryMetadata {
            processed_at: self.processed_at,
            processing_time_ms: self
                .processing_time_ms
                .filter(|ms| ms.is_finite())
                .map(|ms| ms.max(0.0).round() as u64),
            model_version: self.model_version,
        }
    }
}

impl CaseRecord {
    /// Normalize into the domain model. A record without an id is rejected:
    /// persisted cases always carry one.
    pub fn into_case(self) -> Result<PatientCase, WireError> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or(WireError::MissingId)?;

        let summary = self.summary.map(|nested| {
            let risk_words = nested.risk_words.or(self.risk_words).unwrap_or_default();
            CaseSummary {
                chief_complaint: nested.chief_complaint.unwrap_or_default(),
                key_findings: nested.key_findings.unwrap_or_default(),
                assessment: nested.assessment.unwrap_or_default(),
                icd_codes: nested.icd_codes.unwrap_or_default(),
                recommendations: nested.recommendations.unwrap_or_default(),
                risk_words: risk_words
                    .into_iter()
                    .map(RiskWordRecord::normalize)
                    .collect(),
                risk_factors: nested.risk_factors.or(self.risk_factors).unwrap_or_default(),
                confidence_score: nested
                    .confidence_score
                    .or(self.confidence_score)
                    .and_then(normalize_confidence),
                metadata: nested
                    .metadata
                    .or(self.metadata)
                    .map(MetadataRecord::normalize),
            }
        });

        Ok(PatientCase {
            id: CaseId::new(id),
            case_title: self.case_title.unwrap_or_default(),
            patient_age: self
                .patient_age
                .map(AgeValue::into_string)
                .unwrap_or_default(),
            gender: self
                .gender
                .as_deref()
                .and_then(Gender::from_label)
                .unwrap_or(Gender::Other),
            clinical_notes: self.clinical_notes.unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            summary,
        })
    }
}

fn normalize_confidence(score: f64) -> Option<u8> {
    if !score.is_finite() {
        return None;
    }
    Some(score.clamp(0.0, f64::from(CaseSummary::MAX_CONFIDENCE)).round() as u8)
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Parse an RFC 3339 timestamp, or the backend's zone-less
/// `yyyy-MM-ddTHH:mm:ss[.fff]` form (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn record(value: serde_json::Value) -> CaseRecord {
        serde_json::from_value(value).expect("valid case record")
    }

    #[test]
    fn backend_shape_lifts_top_level_extras_into_summary() {
        let case = record(json!({
            "id": "65f0c1",
            "caseTitle": "Septic shock",
            "patientAge": "71",
            "gender": "Female",
            "clinicalNotes": "Fever, hypotension.",
            "createdAt": "2026-02-12T12:00:00",
            "updatedAt": "2026-02-12T12:05:00",
            "summary": {
                "chiefComplaint": "Fever",
                "keyFindings": "Hypotension",
                "assessment": "Sepsis",
                "recommendations": ["Fluids", "Antibiotics"],
                "icdCodes": "A41.9"
            },
            "riskFactors": ["Age > 65"],
            "riskWords": ["sepsis", "shock"],
            "confidenceScore": 87,
            "metadata": {"processedAt": "2026-02-12T12:00:00Z", "modelVersion": "1.0.0"}
        }))
        .into_case()
        .unwrap();

        let summary = case.summary.expect("summary present");
        assert_eq!(summary.confidence_score, Some(87));
        assert_eq!(summary.recommendations, vec!["Fluids", "Antibiotics"]);
        assert_eq!(
            summary.risk_words,
            vec![
                RiskWord::new("sepsis", RiskLevel::High),
                RiskWord::new("shock", RiskLevel::High)
            ]
        );
        assert_eq!(summary.risk_factors, vec!["Age > 65"]);
        let metadata = summary.metadata.expect("metadata");
        assert_eq!(metadata.model_version.as_deref(), Some("1.0.0"));
        assert_eq!(metadata.processing_time_ms, None);
        let created = case.created_at.expect("created_at");
        assert_eq!((created.year(), created.hour()), (2026, 12));
    }

    #[test]
    fn nested_summary_fields_win_over_top_level() {
        let case = record(json!({
            "id": "a1",
            "summary": {
                "riskWords": [{"word": "stroke", "level": "medium"}, {"word": "fall"}],
                "confidenceScore": 42
            },
            "riskWords": ["ignored"],
            "confidenceScore": 99
        }))
        .into_case()
        .unwrap();

        let summary = case.summary.unwrap();
        assert_eq!(summary.confidence_score, Some(42));
        assert_eq!(
            summary.risk_words,
            vec![
                RiskWord::new("stroke", RiskLevel::Medium),
                RiskWord::new("fall", RiskLevel::High)
            ]
        );
    }

    #[test]
    fn unsummarized_case_has_no_summary_even_with_stray_extras() {
        let case = record(json!({
            "id": "a2",
            "caseTitle": "Ankle sprain",
            "patientAge": 34,
            "gender": "male",
            "clinicalNotes": "Inversion injury.",
            "summary": null,
            "riskWords": null,
            "confidenceScore": null
        }))
        .into_case()
        .unwrap();

        assert!(case.summary.is_none());
        assert_eq!(case.patient_age, "34");
        assert_eq!(case.gender, Gender::Male);
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = record(json!({"caseTitle": "No id"})).into_case().unwrap_err();
        assert_eq!(err, WireError::MissingId);
        let err = record(json!({"id": "  "})).into_case().unwrap_err();
        assert_eq!(err, WireError::MissingId);
    }

    #[test]
    fn confidence_is_clamped_and_metadata_time_rounded() {
        let case = record(json!({
            "id": "a3",
            "summary": {
                "confidenceScore": 140.0,
                "metadata": {"processingTimeMs": 12.6, "processedAt": "not a date"}
            }
        }))
        .into_case()
        .unwrap();

        let summary = case.summary.unwrap();
        assert_eq!(summary.confidence_score, Some(100));
        let metadata = summary.metadata.unwrap();
        assert_eq!(metadata.processing_time_ms, Some(13));
        assert_eq!(metadata.processed_at, None);
    }

    #[test]
    fn timestamps_accept_rfc3339_and_zone_less_forms() {
        let zoned = parse_timestamp("2026-02-12T12:00:00+02:00").unwrap();
        assert_eq!(zoned.hour(), 10);
        let naive = parse_timestamp("2026-02-12T12:00:00").unwrap();
        assert_eq!(naive.hour(), 12);
        let fractional = parse_timestamp("2026-02-12T12:00:00.123").unwrap();
        assert_eq!(fractional.nanosecond(), 123_000_000);
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn case_paths_percent_encode_ids() {
        assert_eq!(case_path(&CaseId::new("abc123")), "/cases/abc123");
        assert_eq!(
            summarize_path(&CaseId::new("a/b c")),
            "/cases/a%2Fb%20c/summarize"
        );
    }

    #[test]
    fn upsert_request_serializes_camel_case() {
        let body = CaseUpsertRequest::from(&NewCase {
            case_title: "Chest pain".to_string(),
            patient_age: "65".to_string(),
            gender: Gender::Male,
            clinical_notes: "notes".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "caseTitle": "Chest pain",
                "patientAge": "65",
                "gender": "Male",
                "clinicalNotes": "notes"
            })
        );
    }
}
