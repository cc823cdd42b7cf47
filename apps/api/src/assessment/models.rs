//! Wire models for the assessment API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::pipeline::aggregate::QualificationRating;

/// Per-criterion assessment detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionAssessment {
    /// Evidence chunks retained for this criterion.
    pub matches: Vec<String>,
    /// Best retained evidence score, 0.0 when nothing was retained.
    pub confidence: f32,
    /// Human-readable evaluation line.
    pub evaluation: String,
}

/// A complete O-1A assessment for one CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub matches_by_criterion: BTreeMap<String, Vec<String>>,
    pub qualification_rating: QualificationRating,
    pub rating_explanation: String,
    pub detailed_assessment: BTreeMap<String, CriterionAssessment>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub assessment: Assessment,
}

#[derive(Debug, Serialize)]
pub struct BatchResultItem {
    pub filename: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchAnalysisResponse {
    pub status: String,
    pub results: Vec<BatchResultItem>,
}

#[derive(Debug, Serialize)]
pub struct CriteriaResponse {
    pub status: String,
    pub criteria: Vec<crate::criteria::Criterion>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub status: String,
    pub stats: crate::metrics::StatsSnapshot,
}
