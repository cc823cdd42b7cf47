//! HTML report rendering for a completed assessment: executive summary,
//! criterion cards sorted by confidence, and a disclaimer footer.

use axum::{response::Html, Json};
use chrono::{DateTime, Utc};

use crate::assessment::models::{Assessment, CriterionAssessment};
use crate::errors::AppError;
use crate::pipeline::aggregate::QualificationRating;

/// Evidence excerpts longer than this are truncated in the report.
const EVIDENCE_PREVIEW_CHARS: usize = 300;
/// At most this many evidence excerpts are shown per criterion.
const EVIDENCE_PER_CRITERION: usize = 2;

/// POST /api/v1/report
/// Renders an assessment (as returned by the analyze endpoints) to HTML.
pub async fn handle_report(Json(assessment): Json<Assessment>) -> Result<Html<String>, AppError> {
    Ok(Html(render_report(&assessment, Utc::now())))
}

pub fn render_report(assessment: &Assessment, generated_at: DateTime<Utc>) -> String {
    let rating = rating_label(assessment.qualification_rating);
    let rating_class = rating.to_lowercase();

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>O-1A Visa Assessment Report</title>\n");
    html.push_str("<style>\n");
    html.push_str(REPORT_CSS);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str("<div class=\"header\">\n");
    html.push_str("<h1>O-1A Visa Qualification Assessment Report</h1>\n");
    html.push_str(&format!(
        "<div class=\"report-date\">Generated on {}</div>\n",
        generated_at.format("%B %d, %Y at %H:%M")
    ));
    html.push_str("</div>\n");

    html.push_str("<div class=\"summary-box\">\n<h2>Executive Summary</h2>\n");
    html.push_str(&format!(
        "<div class=\"rating rating-{rating_class}\">Rating: {rating}</div>\n"
    ));
    html.push_str(&format!(
        "<p>{}</p>\n",
        escape_html(&assessment.rating_explanation)
    ));
    html.push_str("</div>\n");

    html.push_str("<h2>Criteria Assessment</h2>\n<div class=\"criteria-list\">\n");
    for (name, details) in sorted_by_confidence(assessment) {
        html.push_str(&criterion_card(name, details));
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"footer\">\n");
    html.push_str(
        "<p>This report is generated by the O-1A Visa Assessment System and is for informational purposes only.</p>\n",
    );
    html.push_str(
        "<p>It does not constitute legal advice. Please consult with an immigration attorney for professional guidance.</p>\n",
    );
    html.push_str("</div>\n</body>\n</html>\n");

    html
}

fn rating_label(rating: QualificationRating) -> &'static str {
    match rating {
        QualificationRating::Low => "LOW",
        QualificationRating::Medium => "MEDIUM",
        QualificationRating::High => "HIGH",
    }
}

/// Criteria sorted by confidence, best first; ties stay alphabetical since
/// the underlying map is ordered.
fn sorted_by_confidence(assessment: &Assessment) -> Vec<(&String, &CriterionAssessment)> {
    let mut entries: Vec<_> = assessment.detailed_assessment.iter().collect();
    entries.sort_by(|a, b| {
        b.1.confidence
            .partial_cmp(&a.1.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}

fn criterion_card(name: &str, details: &CriterionAssessment) -> String {
    let confidence_pct = (details.confidence * 100.0).round() as u32;
    let confidence_class = if details.confidence >= 0.7 {
        "confidence-high"
    } else if details.confidence >= 0.5 {
        "confidence-medium"
    } else {
        "confidence-low"
    };

    let mut evidence_html = String::new();
    if !details.matches.is_empty() {
        evidence_html.push_str("<div class=\"criterion-evidence\">");
        for (i, evidence) in details.matches.iter().take(EVIDENCE_PER_CRITERION).enumerate() {
            evidence_html.push_str(&format!(
                "<p><strong>Evidence {}:</strong> {}</p>",
                i + 1,
                escape_html(&truncate_chars(evidence, EVIDENCE_PREVIEW_CHARS))
            ));
        }
        evidence_html.push_str("</div>");
    }

    format!(
        "<div class=\"criterion-card\">\n\
         <div class=\"criterion-header\">\n\
         <div class=\"criterion-name\">{name}</div>\n\
         <div class=\"criterion-confidence\">{confidence_pct}%</div>\n\
         </div>\n\
         <div class=\"confidence-bar-container\">\n\
         <div class=\"confidence-bar {confidence_class}\" style=\"width: {confidence_pct}%;\"></div>\n\
         </div>\n\
         <p>{evaluation}</p>\n\
         {evidence_html}\n\
         </div>\n",
        name = escape_html(name),
        evaluation = escape_html(&details.evaluation),
    )
}

/// Truncates on a char boundary, appending an ellipsis when anything was cut.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const REPORT_CSS: &str = "\
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; }
.header { text-align: center; margin-bottom: 30px; padding-bottom: 20px; border-bottom: 1px solid #eee; }
.report-date { color: #666; font-size: 0.9em; }
.summary-box { background-color: #f9f9f9; border-radius: 8px; padding: 20px; margin-bottom: 30px; box-shadow: 0 2px 4px rgba(0,0,0,0.05); }
.rating { display: inline-block; font-size: 1.2em; font-weight: bold; padding: 8px 16px; border-radius: 4px; margin-right: 15px; }
.rating-high { background-color: #d4edda; color: #155724; }
.rating-medium { background-color: #fff3cd; color: #856404; }
.rating-low { background-color: #f8d7da; color: #721c24; }
.criteria-list { display: flex; flex-wrap: wrap; gap: 20px; margin-bottom: 30px; }
.criterion-card { flex: 1 0 350px; border: 1px solid #eee; border-radius: 8px; padding: 15px; box-shadow: 0 2px 4px rgba(0,0,0,0.05); }
.criterion-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 10px; }
.criterion-name { font-weight: bold; font-size: 1.1em; }
.confidence-bar-container { background-color: #eee; height: 8px; width: 100%; border-radius: 4px; margin-top: 10px; }
.confidence-bar { height: 100%; border-radius: 4px; }
.confidence-high { background-color: #28a745; }
.confidence-medium { background-color: #ffc107; }
.confidence-low { background-color: #dc3545; }
.criterion-evidence { margin-top: 15px; font-size: 0.9em; max-height: 150px; overflow-y: auto; padding: 10px; background-color: #f9f9f9; border-radius: 4px; }
h2 { color: #444; margin-top: 30px; padding-bottom: 10px; border-bottom: 1px solid #eee; }
.footer { margin-top: 50px; padding-top: 20px; border-top: 1px solid #eee; text-align: center; font-size: 0.9em; color: #666; }
";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn sample_assessment() -> Assessment {
        let mut detailed = BTreeMap::new();
        detailed.insert(
            "Awards".to_string(),
            CriterionAssessment {
                matches: vec!["Won the <Fields> Medal & more".to_string()],
                confidence: 0.92,
                evaluation: "Strong evidence found for Awards criterion.".to_string(),
            },
        );
        detailed.insert(
            "Judging".to_string(),
            CriterionAssessment {
                matches: vec![],
                confidence: 0.2,
                evaluation: "Limited or no strong evidence found for Judging criterion."
                    .to_string(),
            },
        );
        Assessment {
            id: Uuid::new_v4(),
            matches_by_criterion: BTreeMap::new(),
            qualification_rating: QualificationRating::Medium,
            rating_explanation: "Moderate evidence found.".to_string(),
            detailed_assessment: detailed,
        }
    }

    #[test]
    fn test_report_contains_rating_and_criteria() {
        let html = render_report(&sample_assessment(), Utc::now());
        assert!(html.contains("Rating: MEDIUM"));
        assert!(html.contains("rating-medium"));
        assert!(html.contains("Awards"));
        assert!(html.contains("92%"));
    }

    #[test]
    fn test_report_escapes_evidence() {
        let html = render_report(&sample_assessment(), Utc::now());
        assert!(html.contains("&lt;Fields&gt; Medal &amp; more"));
        assert!(!html.contains("<Fields>"));
    }

    #[test]
    fn test_criteria_sorted_by_confidence() {
        let html = render_report(&sample_assessment(), Utc::now());
        let awards_pos = html.find("Awards").unwrap();
        let judging_pos = html.find("Judging").unwrap();
        assert!(awards_pos < judging_pos);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "é".repeat(400);
        let out = truncate_chars(&text, 300);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 303);
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("short", 300), "short");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"x" & 'y'</b>"#),
            "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;"
        );
    }
}
