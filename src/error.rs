//! Error taxonomy shared by the chunker, the vector index, and the pipeline.

use thiserror::Error;

/// Failures surfaced by the retrieval core and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RagError {
    /// Document text was empty or whitespace-only.
    #[error("input text is empty")]
    EmptyInput,
    /// Chunking produced nothing to index.
    #[error("no chunks created from document text")]
    NoContent,
    /// Chunk/vector counts or vector widths disagree.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length (vector width or chunk count).
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
    /// The text extractor rejected the payload or found no text.
    #[error("error extracting document text: {0}")]
    Extraction(String),
    /// The embedding provider failed.
    #[error("error getting embeddings: {0}")]
    Embedding(String),
    /// The answer generator failed.
    #[error("error generating answer: {0}")]
    Generation(String),
    /// Question text was empty or whitespace-only.
    #[error("question cannot be empty")]
    EmptyQuestion,
    /// Invalid sizing or provider settings.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Convenience alias used across the crate.
pub type RagResult<T> = Result<T, RagError>;
