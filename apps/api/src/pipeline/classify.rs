//! Evidence classification — pluggable, trait-based scoring of a retrieved
//! chunk against one criterion.
//!
//! Default: `LexicalClassifier` (pure-Rust, fast, deterministic, fully
//! testable). Optional: `ZeroShotClassifier` (DeBERTa-v3 zero-shot NLI via
//! the Hugging Face inference API).
//!
//! `AppState` holds an `Arc<dyn EvidenceClassifier>`, swapped at startup via
//! ENABLE_REMOTE_CLASSIFIER + HF_API_TOKEN.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::criteria::Criterion;

/// A chunk is retained as evidence when its score clears this threshold.
pub const EVIDENCE_THRESHOLD: f32 = 0.6;

/// Hypothesis template for the zero-shot entailment check.
pub const HYPOTHESIS_TEMPLATE: &str = "This text describes {}.";

/// The zero-shot model served by the remote backend.
pub const ZERO_SHOT_MODEL: &str = "MoritzLaurer/deberta-v3-large-zeroshot-v2.0";

const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co/models";
const MAX_RETRIES: u32 = 3;

/// Outcome of classifying one chunk against one criterion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvidenceScore {
    /// Probability-like score for the "Evidence of {criterion}" label.
    pub score: f32,
    /// True when the evidence label won and cleared `EVIDENCE_THRESHOLD`.
    pub is_evidence: bool,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Classifier returned no labels")]
    EmptyLabels,
}

/// The evidence classifier trait. Implement this to swap backends without
/// touching the pipeline or handlers.
#[async_trait]
pub trait EvidenceClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(
        &self,
        text: &str,
        criterion: &Criterion,
    ) -> Result<EvidenceScore, ClassifierError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LexicalClassifier — default deterministic backend
// ────────────────────────────────────────────────────────────────────────────

/// Scores a chunk by counting criterion signal terms it contains.
///
/// Tiers: 3+ hits → 0.9 (strong), 2 hits → 0.75, 1 hit → 0.65 (just above
/// the evidence threshold), 0 hits → half the description-word coverage,
/// which always stays below the threshold.
pub struct LexicalClassifier;

#[async_trait]
impl EvidenceClassifier for LexicalClassifier {
    fn name(&self) -> &'static str {
        "lexical"
    }

    async fn classify(
        &self,
        text: &str,
        criterion: &Criterion,
    ) -> Result<EvidenceScore, ClassifierError> {
        Ok(lexical_score(text, criterion))
    }
}

fn lexical_score(text: &str, criterion: &Criterion) -> EvidenceScore {
    let lower = text.to_lowercase();

    let hits = criterion
        .signal_terms
        .iter()
        .filter(|term| lower.contains(term.to_lowercase().as_str()))
        .count();

    let score = match hits {
        0 => 0.5 * description_coverage(&lower, criterion),
        1 => 0.65,
        2 => 0.75,
        _ => 0.9,
    };

    EvidenceScore {
        score,
        is_evidence: score > EVIDENCE_THRESHOLD,
    }
}

/// Fraction of the criterion description's content words present in the
/// chunk. Fallback signal when no signal terms are defined or none match.
fn description_coverage(lower_text: &str, criterion: &Criterion) -> f32 {
    let words: Vec<String> = criterion
        .description
        .split_whitespace()
        .map(|w| {
            w.to_lowercase()
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|w| w.len() > 3)
        .collect();

    if words.is_empty() {
        return 0.0;
    }
    let matched = words.iter().filter(|w| lower_text.contains(w.as_str())).count();
    matched as f32 / words.len() as f32
}

// ────────────────────────────────────────────────────────────────────────────
// ZeroShotClassifier — remote NLI backend
// ────────────────────────────────────────────────────────────────────────────

/// Zero-shot entailment classifier over the Hugging Face inference API.
/// Retries on 429 and 5xx with exponential backoff.
pub struct ZeroShotClassifier {
    client: reqwest::Client,
    api_token: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters {
    candidate_labels: Vec<String>,
    hypothesis_template: String,
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f32>,
}

impl ZeroShotClassifier {
    pub fn new(api_token: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            api_token,
            model: ZERO_SHOT_MODEL.to_string(),
        }
    }

    async fn call(&self, body: &ZeroShotRequest<'_>) -> Result<ZeroShotResponse, ClassifierError> {
        let url = format!("{HF_INFERENCE_URL}/{}", self.model);
        let mut last_error: Option<ClassifierError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Zero-shot call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_token)
                .json(body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ClassifierError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("Inference API returned {}: {}", status, message);
                last_error = Some(ClassifierError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(ClassifierError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let body_text = response.text().await?;
            let parsed: ZeroShotResponse = serde_json::from_str(&body_text)?;
            debug!(
                "Zero-shot call succeeded: top label {:?}",
                parsed.labels.first()
            );
            return Ok(parsed);
        }

        Err(last_error.unwrap_or(ClassifierError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl EvidenceClassifier for ZeroShotClassifier {
    fn name(&self) -> &'static str {
        "zero-shot"
    }

    async fn classify(
        &self,
        text: &str,
        criterion: &Criterion,
    ) -> Result<EvidenceScore, ClassifierError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: vec![criterion.evidence_label(), criterion.not_relevant_label()],
                hypothesis_template: HYPOTHESIS_TEMPLATE.to_string(),
            },
        };

        let response = self.call(&request).await?;
        evidence_score_from(&response.labels, &response.scores)
    }
}

/// Extracts the evidence score from a label/score pairing. The chunk counts
/// as evidence only when the evidence label ranked first and its score
/// clears the threshold.
fn evidence_score_from(labels: &[String], scores: &[f32]) -> Result<EvidenceScore, ClassifierError> {
    let position = labels
        .iter()
        .position(|l| l.starts_with("Evidence"))
        .ok_or(ClassifierError::EmptyLabels)?;
    let score = *scores.get(position).ok_or(ClassifierError::EmptyLabels)?;

    let top_is_evidence = position == 0;
    Ok(EvidenceScore {
        score,
        is_evidence: top_is_evidence && score > EVIDENCE_THRESHOLD,
    })
}
