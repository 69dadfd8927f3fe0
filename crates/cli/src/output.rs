use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use clinicase_core::{CaseSummary, PatientCase};
use clinicase_workbench::CasePage;

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// One listing page plus the "Showing x-y of n" footer.
pub fn render_page(page: &CasePage<'_>) -> String {
    let mut out = String::new();
    if page.is_empty() {
        out.push_str("No cases found\n");
        return out;
    }

    for case in &page.items {
        let _ = writeln!(out, "{}  {}", case.id, case.case_title);
        let _ = write!(out, "    Age: {} | Gender: {}", case.patient_age, case.gender);
        if let Some(summary) = &case.summary {
            let _ = write!(out, " | Confidence: {}%", summary.display_confidence());
            if summary.has_risk_words() {
                out.push_str(" | High Risk");
            }
        }
        out.push('\n');
    }

    if let Some((first, last)) = page.showing() {
        let _ = writeln!(
            out,
            "\nShowing {first}-{last} of {} cases · Page {} of {}",
            page.total_items, page.page, page.total_pages
        );
    }
    out
}

/// Full case view: header, notes, and the summary when there is one.
pub fn render_case(case: &PatientCase) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", case.case_title);
    let _ = writeln!(out, "  ID:      {}", case.id);
    let _ = writeln!(out, "  Age:     {}", case.patient_age);
    let _ = writeln!(out, "  Gender:  {}", case.gender);
    let _ = writeln!(out, "  Created: {}", timestamp(case.created_at));
    let _ = writeln!(out, "  Updated: {}", timestamp(case.updated_at));
    let _ = writeln!(out, "\nClinical Notes\n{}", case.clinical_notes);

    match &case.summary {
        Some(summary) => render_summary(&mut out, summary),
        None => out.push_str("\nCase not yet summarized. Run `clinicase summarize <id>`.\n"),
    }
    out
}

fn render_summary(out: &mut String, summary: &CaseSummary) {
    out.push_str("\nSummarization Results\n");
    let _ = writeln!(out, "\nChief Complaint\n{}", summary.chief_complaint);
    let _ = writeln!(out, "\nKey Findings\n{}", summary.key_findings);
    let _ = writeln!(out, "\nAssessment\n{}", summary.assessment);

    if !summary.risk_words.is_empty() {
        out.push_str("\nRisk Words Detected\n");
        for risk in &summary.risk_words {
            let _ = writeln!(out, "  [{}] {}", risk.level, risk.word);
        }
    }

    if !summary.risk_factors.is_empty() {
        out.push_str("\nRisk Factors\n");
        for factor in &summary.risk_factors {
            let _ = writeln!(out, "  - {factor}");
        }
    }

    out.push_str("\nRecommendations\n");
    for (idx, rec) in summary.recommendations.iter().enumerate() {
        let _ = writeln!(out, "  {}. {rec}", idx + 1);
    }

    let _ = writeln!(out, "\nICD Codes\n{}", summary.icd_codes);
    let _ = writeln!(out, "\nConfidence Score: {}%", summary.display_confidence());

    if let Some(meta) = &summary.metadata {
        out.push_str("\nMetadata\n");
        let _ = writeln!(out, "  Processed at: {}", timestamp(meta.processed_at));
        if let Some(ms) = meta.processing_time_ms {
            let _ = writeln!(out, "  Processing time: {ms} ms");
        }
        if let Some(version) = &meta.model_version {
            let _ = writeln!(out, "  Model version: {version}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinicase_core::{testing, RiskLevel};
    use clinicase_workbench::{view, CaseStore};

    #[test]
    fn page_footer_matches_listing_format() {
        let mut store = CaseStore::new();
        store.replace_all(
            (0..7)
                .map(|i| testing::case_created(&format!("c{i}"), 100 - i))
                .collect(),
        );
        let page = view::derive_page(&store, "", 2, 5);
        let text = render_page(&page);
        assert!(text.contains("c5  Case c5"));
        assert!(text.ends_with("Showing 6-7 of 7 cases · Page 2 of 2\n"), "{text}");
    }

    #[test]
    fn high_risk_badge_only_for_cases_with_risk_words() {
        let mut store = CaseStore::new();
        let mut risky = testing::case_created("risky", 2);
        risky.summary = Some(testing::summary(Some(87), &[("sepsis", RiskLevel::High)]));
        let mut calm = testing::case_created("calm", 1);
        calm.summary = Some(testing::summary(None, &[]));
        store.replace_all(vec![risky, calm]);

        let text = render_page(&view::derive_page(&store, "", 1, 5));
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[1].ends_with("Confidence: 87% | High Risk"), "{}", lines[1]);
        assert!(lines[3].ends_with("Confidence: 0%"), "{}", lines[3]);
    }

    #[test]
    fn empty_listing_says_so() {
        let store = CaseStore::new();
        assert_eq!(render_page(&view::derive_page(&store, "x", 1, 5)), "No cases found\n");
    }

    #[test]
    fn case_view_numbers_recommendations_and_lists_risks() {
        let mut case = testing::case("a");
        case.summary = Some(testing::summary(
            Some(87),
            &[("sepsis", RiskLevel::High), ("hypotension", RiskLevel::Medium)],
        ));
        let text = render_case(&case);
        assert!(text.contains("  1. Start broad-spectrum antibiotics\n"));
        assert!(text.contains("  2. Obtain blood cultures\n"));
        assert!(text.contains("  [High] sepsis\n"), "{text}");
        assert!(text.contains("  [Medium] hypotension\n"));
        assert!(text.contains("  - Immunosuppression\n"));
        assert!(text.contains("Confidence Score: 87%"));
        assert!(text.contains("Model version: 1.0.0"));
    }

    #[test]
    fn unsummarized_case_points_at_summarize() {
        let text = render_case(&testing::case("a"));
        assert!(text.contains("Case not yet summarized"));
        assert!(!text.contains("Confidence Score"));
    }
}
