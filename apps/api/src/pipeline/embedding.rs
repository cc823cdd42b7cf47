//! Embedding backends behind the `Embedder` trait.
//!
//! Default: `FastEmbedder` (local sentence-embedding model via fastembed).
//! Alternative: `HashEmbedder` (deterministic token hashing — no model
//! download, used in tests and offline dev). Swap via EMBEDDER_BACKEND env.

use anyhow::{anyhow, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

/// Maps texts to fixed-dimension vectors. Called from `spawn_blocking`; the
/// work is CPU-bound.
pub trait Embedder: Send + Sync {
    fn name(&self) -> &'static str;
    fn dimension(&self) -> usize;
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

// ────────────────────────────────────────────────────────────────────────────
// FastEmbedder — local model backend
// ────────────────────────────────────────────────────────────────────────────

/// fastembed-backed embedder using all-MiniLM-L6-v2 (384 dimensions).
/// Model weights are fetched on first initialization.
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
}

pub const FASTEMBED_DIMENSION: usize = 384;

impl FastEmbedder {
    pub fn new() -> Result<Self> {
        let model = TextEmbedding::try_new(
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false),
        )?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for FastEmbedder {
    fn name(&self) -> &'static str {
        "fastembed"
    }

    fn dimension(&self) -> usize {
        FASTEMBED_DIMENSION
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut model = self
            .model
            .lock()
            .map_err(|_| anyhow!("embedding model lock poisoned"))?;
        let embeddings = model.embed(texts.to_vec(), None)?;
        Ok(embeddings)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashEmbedder — deterministic backend for tests and offline dev
// ────────────────────────────────────────────────────────────────────────────

/// Hashes lowercased tokens into buckets and L2-normalizes the counts.
/// Similarity degrades to token overlap, which is enough for retrieval
/// plumbing tests without any model on disk.
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dimension: 384 }
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let mut vector = vec![0.0f32; self.dimension];
                for token in text.split_whitespace() {
                    let token = token.to_lowercase();
                    let token = token.trim_matches(|c: char| !c.is_alphanumeric());
                    if token.is_empty() {
                        continue;
                    }
                    let mut hasher = DefaultHasher::new();
                    token.hash(&mut hasher);
                    let bucket = (hasher.finish() as usize) % self.dimension;
                    vector[bucket] += 1.0;
                }
                l2_normalize(&mut vector);
                vector
            })
            .collect())
    }
}

fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::index::cosine_similarity;

    #[test]
    fn test_hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed(&["won the Nobel Prize".to_string()]).unwrap();
        let b = embedder.embed(&["won the Nobel Prize".to_string()]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_embedder_dimension() {
        let embedder = HashEmbedder::new(64);
        let out = embedder.embed(&["some text".to_string()]).unwrap();
        assert_eq!(out[0].len(), 64);
    }

    #[test]
    fn test_vectors_are_normalized() {
        let embedder = HashEmbedder::default();
        let out = embedder
            .embed(&["a b c d e f g".to_string()])
            .unwrap();
        let norm: f32 = out[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
    }

    #[test]
    fn test_overlapping_texts_more_similar() {
        let embedder = HashEmbedder::default();
        let out = embedder
            .embed(&[
                "recipient of an international research award".to_string(),
                "research award recipient honored internationally".to_string(),
                "enjoys hiking and photography on weekends".to_string(),
            ])
            .unwrap();
        let related = cosine_similarity(&out[0], &out[1]);
        let unrelated = cosine_similarity(&out[0], &out[2]);
        assert!(
            related > unrelated,
            "related {related} should exceed unrelated {unrelated}"
        );
    }

    #[test]
    fn test_empty_text_gives_zero_vector() {
        let embedder = HashEmbedder::default();
        let out = embedder.embed(&["   ".to_string()]).unwrap();
        assert!(out[0].iter().all(|v| *v == 0.0));
    }
}
