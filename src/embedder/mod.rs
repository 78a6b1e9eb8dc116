//! Embedding providers.

pub mod openai;

use crate::error::RagResult;
use crate::vector_index::Embedding;

pub use openai::OpenAiEmbedder;

/// Turns an ordered batch of strings into one vector per string, same order.
pub trait Embedder: Send + Sync {
    /// Fails with [`crate::RagError::Embedding`] on provider failure.
    fn embed(&self, batch: &[&str]) -> RagResult<Vec<Embedding>>;
}
