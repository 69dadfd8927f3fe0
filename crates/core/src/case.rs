use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Backend-assigned case identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CaseId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for CaseId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Patient gender as captured on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive lookup of a form value.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity attached to a flagged risk word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskLevel {
    #[default]
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Lenient, case-insensitive parse. Unknown labels (including the
    /// backend's `CRITICAL` keyword tier) map to [`RiskLevel::High`].
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "medium" | "moderate" => Self::Medium,
            "low" => Self::Low,
            _ => Self::High,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged term surfaced by summarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWord {
    pub word: String,
    pub level: RiskLevel,
}

impl RiskWord {
    pub fn new(word: impl Into<String>, level: RiskLevel) -> Self {
        Self {
            word: word.into(),
            level,
        }
    }
}

/// Provenance of a summary run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetadata {
    pub processed_at: Option<DateTime<Utc>>,
    pub processing_time_ms: Option<u64>,
    pub model_version: Option<String>,
}

/// Structured AI-generated analysis attached to a case.
///
/// Always replaced as a whole by a later successful summarize call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    pub chief_complaint: String,
    pub key_findings: String,
    pub assessment: String,
    pub icd_codes: String,
    /// Order is significant (rendered as a numbered list).
    pub recommendations: Vec<String>,
    pub risk_words: Vec<RiskWord>,
    pub risk_factors: Vec<String>,
    /// `None` is "unset", distinct from a score of zero.
    pub confidence_score: Option<u8>,
    pub metadata: Option<SummaryMetadata>,
}

impl CaseSummary {
    pub const MAX_CONFIDENCE: u8 = 100;

    /// Score for display: unset renders as 0.
    pub fn display_confidence(&self) -> u8 {
        self.confidence_score.unwrap_or(0)
    }

    /// Drives the "High Risk" badge in listings.
    pub fn has_risk_words(&self) -> bool {
        !self.risk_words.is_empty()
    }
}

/// A persisted patient case. Always carries a backend-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientCase {
    pub id: CaseId,
    pub case_title: String,
    pub patient_age: String,
    pub gender: Gender,
    pub clinical_notes: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub summary: Option<CaseSummary>,
}

impl PatientCase {
    pub fn is_summarized(&self) -> bool {
        self.summary.is_some()
    }

    /// Case-insensitive substring match on the title. `needle` must already
    /// be lowercase; an empty needle matches everything.
    pub fn title_matches(&self, needle: &str) -> bool {
        needle.is_empty() || self.case_title.to_lowercase().contains(needle)
    }

    /// The listing field values, detached from the id and backend metadata.
    pub fn to_new_case(&self) -> NewCase {
        NewCase {
            case_title: self.case_title.clone(),
            patient_age: self.patient_age.clone(),
            gender: self.gender,
            clinical_notes: self.clinical_notes.clone(),
        }
    }
}

/// Recency ordering: newest `created_at` first, missing timestamps last.
/// Equal keys compare `Equal` so stable sorts keep arrival order.
pub fn compare_recency(lhs: &PatientCase, rhs: &PatientCase) -> Ordering {
    match (lhs.created_at, rhs.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A validated, not-yet-persisted case. Only the intake form produces these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub case_title: String,
    pub patient_age: String,
    pub gender: Gender,
    pub clinical_notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn case_at(id: &str, created: Option<i64>) -> PatientCase {
        PatientCase {
            id: CaseId::new(id),
            case_title: format!("Case {id}"),
            patient_age: "40".to_string(),
            gender: Gender::Other,
            clinical_notes: "notes".to_string(),
            created_at: created.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            updated_at: None,
            summary: None,
        }
    }

    #[test]
    fn risk_level_parse_is_case_insensitive_and_defaults_high() {
        assert_eq!(RiskLevel::from_label("LOW"), RiskLevel::Low);
        assert_eq!(RiskLevel::from_label(" medium "), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_label("High"), RiskLevel::High);
        assert_eq!(RiskLevel::from_label("CRITICAL"), RiskLevel::High);
        assert_eq!(RiskLevel::from_label(""), RiskLevel::High);
    }

    #[test]
    fn gender_from_label_accepts_form_values() {
        assert_eq!(Gender::from_label("Male"), Some(Gender::Male));
        assert_eq!(Gender::from_label("female"), Some(Gender::Female));
        assert_eq!(Gender::from_label(" OTHER "), Some(Gender::Other));
        assert_eq!(Gender::from_label(""), None);
        assert_eq!(Gender::from_label("unknown"), None);
    }

    #[test]
    fn recency_orders_newest_first_and_undated_last() {
        let mut cases = [
            case_at("old", Some(100)),
            case_at("undated", None),
            case_at("new", Some(300)),
            case_at("mid", Some(200)),
        ];
        cases.sort_by(compare_recency);
        let ids: Vec<_> = cases.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old", "undated"]);
    }

    #[test]
    fn display_confidence_treats_unset_as_zero() {
        let mut summary = CaseSummary::default();
        assert_eq!(summary.display_confidence(), 0);
        assert_eq!(summary.confidence_score, None);
        summary.confidence_score = Some(0);
        assert_eq!(summary.display_confidence(), 0);
        assert_eq!(summary.confidence_score, Some(0));
    }

    #[test]
    fn title_match_is_case_insensitive_substring() {
        let mut case = case_at("a", None);
        case.case_title = "Acute Chest Pain".to_string();
        assert!(case.title_matches("chest"));
        assert!(case.title_matches(""));
        assert!(!case.title_matches("sepsis"));
    }
}
