//! Exact nearest-neighbor index over one document's chunk embeddings.
//!
//! The index holds a single generation of aligned `(chunk, vector)` pairs.
//! `store` builds the replacement generation off-lock and swaps it in, and
//! `search` clones the current generation handle before scanning, so a search
//! never observes a half-replaced index.

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{RagError, RagResult};

/// Embedding vector produced by the embedding provider.
pub type Embedding = Vec<f32>;

/// Output width of `text-embedding-ada-002`.
pub const DEFAULT_DIMENSIONS: usize = 1536;

/// Single ranked search result.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Position of the chunk within the stored generation.
    pub chunk_index: usize,
    /// Chunk body text.
    pub text: String,
    /// Squared Euclidean distance to the query.
    pub distance: f32,
}

#[derive(Debug, Default)]
struct Generation {
    chunks: Vec<String>,
    vectors: Vec<Embedding>,
}

/// Brute-force squared-L2 index, replaced wholesale on every `store`.
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    current: RwLock<Arc<Generation>>,
}

impl VectorIndex {
    /// Creates an empty index for vectors of width `dimensions`.
    pub fn new(dimensions: usize) -> RagResult<Self> {
        if dimensions == 0 {
            return Err(RagError::Configuration(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            dimensions,
            current: RwLock::new(Arc::new(Generation::default())),
        })
    }

    /// Configured vector width.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of chunks in the current generation.
    pub fn len(&self) -> usize {
        self.snapshot().chunks.len()
    }

    /// True when nothing has been stored (or the index was cleared).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the current generation with `chunks` and their `vectors`.
    ///
    /// Fails with [`RagError::DimensionMismatch`] when the counts differ or any
    /// vector has the wrong width; the previous generation is kept in that case.
    pub fn store(&self, chunks: Vec<String>, vectors: Vec<Embedding>) -> RagResult<()> {
        if chunks.len() != vectors.len() {
            return Err(RagError::DimensionMismatch {
                expected: chunks.len(),
                actual: vectors.len(),
            });
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            });
        }

        let count = chunks.len();
        self.swap(Generation { chunks, vectors });
        tracing::debug!(chunks = count, "stored new index generation");
        Ok(())
    }

    /// Returns up to `k` chunk texts ordered by ascending distance to `query`.
    pub fn search(&self, query: &[f32], k: usize) -> RagResult<Vec<String>> {
        Ok(self
            .search_scored(query, k)?
            .into_iter()
            .map(|hit| hit.text)
            .collect())
    }

    /// Like [`VectorIndex::search`] but keeps indices and distances.
    ///
    /// Equal distances are ordered by ascending chunk index.
    pub fn search_scored(&self, query: &[f32], k: usize) -> RagResult<Vec<SearchHit>> {
        if query.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        let generation = self.snapshot();
        if k == 0 || generation.vectors.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, usize)> = generation
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vector)| (squared_euclidean(query, vector), idx))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(distance, idx)| SearchHit {
                chunk_index: idx,
                text: generation.chunks[idx].clone(),
                distance,
            })
            .collect())
    }

    /// Drops the current generation. Idempotent.
    pub fn clear(&self) {
        self.swap(Generation::default());
    }

    fn snapshot(&self) -> Arc<Generation> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    fn swap(&self, generation: Generation) {
        let next = Arc::new(generation);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }
}

/// Squared Euclidean distance between two equally sized vectors.
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}
