//! In-memory nearest-neighbor index over chunk embeddings. Brute-force
//! cosine scan; a CV produces tens of chunks, not millions.

use anyhow::Result;

use crate::pipeline::chunker::Chunk;
use crate::pipeline::embedding::Embedder;

/// One retrieval hit: chunk index into the original chunk list plus its
/// cosine similarity to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub chunk_id: usize,
    pub score: f32,
}

pub struct VectorIndex {
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Embeds all chunks and builds the index. Chunk ids are positional.
    pub fn build(embedder: &dyn Embedder, chunks: &[Chunk]) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = if texts.is_empty() {
            Vec::new()
        } else {
            embedder.embed(&texts)?
        };
        Ok(Self { vectors })
    }

    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Self {
        Self { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top-k chunks by cosine similarity, best first. Ties keep the earlier
    /// chunk first so results are stable.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<Hit> {
        let mut hits: Vec<Hit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(chunk_id, v)| Hit {
                chunk_id,
                score: cosine_similarity(query, v),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk_id.cmp(&b.chunk_id))
        });
        hits.truncate(k);
        hits
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero norm or the
/// dimensions disagree.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
