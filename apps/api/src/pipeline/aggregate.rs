//! Aggregation: per-criterion confidence and the overall qualification
//! rating with its explanation.

use serde::{Deserialize, Serialize};

/// A criterion counts as strongly evidenced above this confidence.
pub const STRONG_CONFIDENCE: f32 = 0.7;
/// A criterion counts as moderately evidenced above this confidence (and at
/// or below the strong bound).
pub const MODERATE_CONFIDENCE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualificationRating {
    Low,
    Medium,
    High,
}

/// Confidence for one criterion: the best score among retained evidence
/// chunks, or 0.0 when nothing was retained.
pub fn criterion_confidence(retained_scores: &[f32]) -> f32 {
    retained_scores.iter().copied().fold(0.0f32, f32::max)
}

/// Human-readable per-criterion evaluation line.
pub fn criterion_evaluation(name: &str, confidence: f32) -> String {
    if confidence > 0.8 {
        format!("Strong evidence found for {name} criterion.")
    } else if confidence > 0.6 {
        format!("Moderate evidence found for {name} criterion.")
    } else {
        format!("Limited or no strong evidence found for {name} criterion.")
    }
}

/// Derives the overall qualification rating from all criterion confidences.
///
/// HIGH needs at least four strong criteria and an average above the strong
/// bound; MEDIUM needs three criteria at moderate-or-better and an average
/// above the moderate bound; everything else is LOW. Explanations reference
/// the USCIS minimum of three satisfied criteria.
pub fn overall_rating(confidences: &[f32]) -> (QualificationRating, String) {
    let total = confidences.len();
    if total == 0 {
        return (
            QualificationRating::Low,
            "No criteria were assessed.".to_string(),
        );
    }

    let strong = confidences.iter().filter(|c| **c > STRONG_CONFIDENCE).count();
    let moderate = confidences
        .iter()
        .filter(|c| **c > MODERATE_CONFIDENCE && **c <= STRONG_CONFIDENCE)
        .count();
    let avg = confidences.iter().sum::<f32>() / total as f32;

    if strong >= 4 && avg > STRONG_CONFIDENCE {
        let explanation = format!(
            "Strong evidence found for {strong} out of {total} criteria. \
             According to USCIS guidelines, an applicant must satisfy at least 3 criteria to qualify. \
             With {strong} criteria strongly satisfied, the applicant appears to be a strong candidate."
        );
        (QualificationRating::High, explanation)
    } else if strong + moderate >= 3 && avg > MODERATE_CONFIDENCE {
        let explanation = format!(
            "Moderate evidence found for at least 3 out of {total} criteria. \
             While the minimum requirement of 3 criteria appears to be met, the strength of evidence \
             suggests a moderate chance of qualification."
        );
        (QualificationRating::Medium, explanation)
    } else {
        let explanation = format!(
            "Limited evidence found for only {strong} out of {total} criteria with strong confidence. \
             USCIS requires applicants to satisfy at least 3 criteria with strong evidence. \
             The current evidence may not be sufficient for O-1A qualification."
        );
        (QualificationRating::Low, explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_is_max_of_scores() {
        assert_eq!(criterion_confidence(&[0.65, 0.9, 0.7]), 0.9);
    }

    #[test]
    fn test_confidence_empty_is_zero() {
        assert_eq!(criterion_confidence(&[]), 0.0);
    }

    #[test]
    fn test_evaluation_tiers() {
        assert!(criterion_evaluation("Awards", 0.85).starts_with("Strong evidence"));
        assert!(criterion_evaluation("Awards", 0.7).starts_with("Moderate evidence"));
        assert!(criterion_evaluation("Awards", 0.5).starts_with("Limited or no strong"));
    }

    #[test]
    fn test_high_rating_needs_four_strong_and_high_average() {
        let confidences = vec![0.9, 0.85, 0.8, 0.75, 0.6, 0.5, 0.5, 0.5];
        // Four strong criteria but average 0.675 — not HIGH.
        let (rating, _) = overall_rating(&confidences);
        assert_eq!(rating, QualificationRating::Medium);

        let confidences = vec![0.9, 0.9, 0.85, 0.8, 0.7, 0.6, 0.5, 0.5];
        let avg: f32 = confidences.iter().sum::<f32>() / 8.0;
        assert!(avg > STRONG_CONFIDENCE);
        let (rating, explanation) = overall_rating(&confidences);
        assert_eq!(rating, QualificationRating::High);
        assert!(explanation.contains("4 out of 8"));
    }

    #[test]
    fn test_medium_rating_counts_moderate_criteria() {
        // Two strong + two moderate criteria, average above the moderate bound.
        let confidences = vec![0.9, 0.8, 0.65, 0.65];
        let (rating, _) = overall_rating(&confidences);
        assert_eq!(rating, QualificationRating::Medium);
    }

    #[test]
    fn test_exactly_strong_bound_counts_as_moderate() {
        // 0.7 is not strictly above the strong bound.
        let confidences = vec![0.7, 0.7, 0.7, 0.7];
        let (rating, _) = overall_rating(&confidences);
        assert_eq!(rating, QualificationRating::Medium);
    }

    #[test]
    fn test_low_rating_with_weak_evidence() {
        let confidences = vec![0.3, 0.2, 0.0, 0.1, 0.0, 0.0, 0.0, 0.5];
        let (rating, explanation) = overall_rating(&confidences);
        assert_eq!(rating, QualificationRating::Low);
        assert!(explanation.contains("0 out of 8"));
    }

    #[test]
    fn test_empty_confidences_is_low() {
        let (rating, _) = overall_rating(&[]);
        assert_eq!(rating, QualificationRating::Low);
    }

    #[test]
    fn test_rating_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&QualificationRating::High).unwrap(),
            "\"high\""
        );
    }
}
