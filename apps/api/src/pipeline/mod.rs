//! The five-stage assessment pipeline: chunk → embed/index → retrieve →
//! classify → aggregate. Text extraction happens upstream in the handlers.

pub mod aggregate;
pub mod chunker;
pub mod classify;
pub mod embedding;
pub mod index;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use uuid::Uuid;

use crate::assessment::models::{Assessment, CriterionAssessment};
use crate::criteria::CriteriaSet;
use crate::errors::AppError;
use crate::pipeline::aggregate::{criterion_confidence, criterion_evaluation, overall_rating};
use crate::pipeline::chunker::{chunk_document, Chunk};
use crate::pipeline::classify::EvidenceClassifier;
use crate::pipeline::embedding::Embedder;
use crate::pipeline::index::VectorIndex;

/// Chunks shorter than this many words are never classified; they carry too
/// little context to count as evidence.
const MIN_CHUNK_WORDS: usize = 10;

/// Runs the full assessment over already-extracted CV text.
///
/// Embedding is CPU-bound and runs on the blocking pool; classification is
/// awaited per retrieved chunk.
pub async fn analyze_text(
    text: &str,
    criteria: &CriteriaSet,
    embedder: Arc<dyn Embedder>,
    classifier: &dyn EvidenceClassifier,
    top_k: usize,
) -> Result<Assessment, AppError> {
    let chunks = chunk_document(text);
    if chunks.is_empty() {
        return Err(AppError::Extraction(
            "Document contains no extractable text".to_string(),
        ));
    }
    info!("Split CV into {} chunks", chunks.len());

    let queries: Vec<String> = criteria.iter().map(|c| c.retrieval_query()).collect();
    let (vector_index, query_vectors) =
        build_index(embedder, chunks.clone(), queries).await?;

    let k = top_k.min(chunks.len());
    let mut matches_by_criterion = BTreeMap::new();
    let mut detailed_assessment = BTreeMap::new();
    let mut confidences = Vec::with_capacity(criteria.len());

    for (criterion, query_vector) in criteria.iter().zip(query_vectors.iter()) {
        debug!("Analyzing criterion: {}", criterion.name);

        let hits = vector_index.search(query_vector, k);

        let mut matches = Vec::new();
        let mut scores = Vec::new();
        for hit in hits {
            let chunk: &Chunk = &chunks[hit.chunk_id];
            if chunk.text.split_whitespace().count() < MIN_CHUNK_WORDS {
                continue;
            }

            let outcome = classifier
                .classify(&chunk.text, criterion)
                .await
                .map_err(|e| AppError::Inference(e.to_string()))?;

            if outcome.is_evidence {
                matches.push(chunk.text.clone());
                scores.push(outcome.score);
            }
        }

        let confidence = criterion_confidence(&scores);
        confidences.push(confidence);

        matches_by_criterion.insert(criterion.name.clone(), matches.clone());
        detailed_assessment.insert(
            criterion.name.clone(),
            CriterionAssessment {
                matches,
                confidence,
                evaluation: criterion_evaluation(&criterion.name, confidence),
            },
        );
    }

    let (qualification_rating, rating_explanation) = overall_rating(&confidences);
    info!("Assessment complete: {:?}", qualification_rating);

    Ok(Assessment {
        id: Uuid::new_v4(),
        matches_by_criterion,
        qualification_rating,
        rating_explanation,
        detailed_assessment,
    })
}

/// Embeds chunks and criterion queries on the blocking pool and builds the
/// in-memory index.
async fn build_index(
    embedder: Arc<dyn Embedder>,
    chunks: Vec<Chunk>,
    queries: Vec<String>,
) -> Result<(VectorIndex, Vec<Vec<f32>>), AppError> {
    let result = tokio::task::spawn_blocking(move || {
        let index = VectorIndex::build(embedder.as_ref(), &chunks)?;
        let query_vectors = embedder.embed(&queries)?;
        anyhow::Ok((index, query_vectors))
    })
    .await
    .context("embedding task panicked")
    .map_err(AppError::Internal)?;

    result.map_err(AppError::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::LexicalClassifier;
    use crate::pipeline::embedding::HashEmbedder;

    fn test_criteria() -> CriteriaSet {
        let json = serde_json::json!({
            "o1a_criteria": [
                {
                    "key": "awards",
                    "name": "Awards",
                    "description": "Receipt of nationally or internationally recognized prizes or awards for excellence",
                    "detailed_description": "Documentation of awards.",
                    "signal_terms": ["award", "prize", "medal", "winner"]
                },
                {
                    "key": "scholarly_articles",
                    "name": "Scholarly Articles",
                    "description": "Authorship of scholarly articles in professional journals or major media",
                    "detailed_description": "Documentation of publications.",
                    "signal_terms": ["journal", "published", "publication", "conference paper"]
                }
            ]
        });
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), serde_json::to_string(&json).unwrap()).unwrap();
        CriteriaSet::load(file.path()).unwrap()
    }

    fn strong_cv() -> String {
        let mut text = String::new();
        text.push_str(
            "Awards and honors: winner of the national innovation award, \
             recipient of the Dijkstra prize, and a gold medal at the ICPC finals.\n\n",
        );
        text.push_str(
            "Publications: published twelve articles in the Journal of Machine Learning \
             Research and presented a conference paper at NeurIPS on retrieval systems.\n\n",
        );
        text.push_str(
            "Hobbies include trail running, chess, and amateur astronomy with friends.\n\n",
        );
        text
    }

    #[tokio::test]
    async fn test_analyze_text_finds_evidence() {
        let criteria = test_criteria();
        let assessment = analyze_text(
            &strong_cv(),
            &criteria,
            Arc::new(HashEmbedder::default()),
            &LexicalClassifier,
            5,
        )
        .await
        .unwrap();

        let awards = &assessment.detailed_assessment["Awards"];
        assert!(
            awards.confidence > 0.8,
            "awards confidence was {}",
            awards.confidence
        );
        assert!(!awards.matches.is_empty());

        let articles = &assessment.detailed_assessment["Scholarly Articles"];
        assert!(articles.confidence > 0.6);
        assert_eq!(
            assessment.matches_by_criterion["Awards"],
            awards.matches
        );
    }

    #[tokio::test]
    async fn test_analyze_empty_text_is_extraction_error() {
        let criteria = test_criteria();
        let err = analyze_text(
            "  ",
            &criteria,
            Arc::new(HashEmbedder::default()),
            &LexicalClassifier,
            5,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_short_chunks_are_skipped() {
        let criteria = test_criteria();
        // Nine words — under the classification minimum.
        let assessment = analyze_text(
            "award prize medal winner journal published publication one two",
            &criteria,
            Arc::new(HashEmbedder::default()),
            &LexicalClassifier,
            5,
        )
        .await
        .unwrap();
        for detail in assessment.detailed_assessment.values() {
            assert!(detail.matches.is_empty());
            assert_eq!(detail.confidence, 0.0);
        }
        assert_eq!(
            assessment.qualification_rating,
            crate::pipeline::aggregate::QualificationRating::Low
        );
    }

    #[tokio::test]
    async fn test_irrelevant_cv_rates_low() {
        let criteria = test_criteria();
        let text = "I spend most weekends hiking in the mountains with my dog, \
                    taking photographs of wildflowers and cooking for friends and family.";
        let assessment = analyze_text(
            text,
            &criteria,
            Arc::new(HashEmbedder::default()),
            &LexicalClassifier,
            5,
        )
        .await
        .unwrap();
        assert_eq!(
            assessment.qualification_rating,
            crate::pipeline::aggregate::QualificationRating::Low
        );
    }

    #[test]
    fn test_min_chunk_words_matches_original_cutoff() {
        let short = "one two three four five six seven eight nine";
        assert!(short.split_whitespace().count() < MIN_CHUNK_WORDS);
    }
}
