//! Ingestion and question answering over a single uploaded document.
//!
//! `ingest` runs extract → chunk → embed (one batched call) → store, and
//! `answer` runs embed question → search → context assembly → generate.
//! Both embed through the same [`Embedder`] call path so question vectors live
//! in the same space as the stored chunk vectors.

use std::sync::Arc;

use crate::chunker::{Chunker, ChunkingConfig};
use crate::embedder::Embedder;
use crate::error::{RagError, RagResult};
use crate::extract::TextExtractor;
use crate::generator::AnswerGenerator;
use crate::vector_index::{Embedding, SearchHit, VectorIndex, DEFAULT_DIMENSIONS};

/// Returned instead of calling the generator when nothing has been ingested.
pub const NO_INFORMATION_ANSWER: &str =
    "I don't have any information to answer this question. Please upload a PDF first.";

/// System instruction sent with every generation request.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that answers questions based on provided context.";

/// Chunks retrieved per question unless configured otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Pipeline tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Chunk sizing.
    pub chunking: ChunkingConfig,
    /// Chunks retrieved per question.
    pub top_k: usize,
    /// Embedding width enforced by the index.
    pub dimensions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            top_k: DEFAULT_TOP_K,
            dimensions: DEFAULT_DIMENSIONS,
        }
    }
}

impl PipelineConfig {
    /// Rejects sizings the chunker, the index, or retrieval cannot work with.
    pub fn validate(&self) -> RagResult<()> {
        self.chunking.validate()?;
        if self.top_k == 0 {
            return Err(RagError::Configuration(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.dimensions == 0 {
            return Err(RagError::Configuration(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Owns the chunker and the index; talks to the external collaborators.
pub struct RetrievalPipeline {
    chunker: Chunker,
    index: VectorIndex,
    top_k: usize,
    extractor: Arc<dyn TextExtractor>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn AnswerGenerator>,
}

impl RetrievalPipeline {
    /// Builds a pipeline with an empty index.
    pub fn new(
        config: PipelineConfig,
        extractor: Arc<dyn TextExtractor>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> RagResult<Self> {
        config.validate()?;
        Ok(Self {
            chunker: Chunker::new(config.chunking)?,
            index: VectorIndex::new(config.dimensions)?,
            top_k: config.top_k,
            extractor,
            embedder,
            generator,
        })
    }

    /// Replaces the index with the chunks of `raw` and returns the chunk count.
    pub fn ingest(&self, raw: &[u8]) -> RagResult<usize> {
        let text = self.extractor.extract(raw)?;
        if text.trim().is_empty() {
            return Err(RagError::Extraction("no text found in document".to_string()));
        }

        let chunks = self.chunker.split(&text)?;
        // non-blank text always yields a chunk; NoContent is the contract if that ever breaks
        if chunks.is_empty() {
            return Err(RagError::NoContent);
        }

        let refs: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let vectors = self.embed_texts(&refs)?;
        let count = chunks.len();
        self.index.store(chunks, vectors)?;
        tracing::info!(chunks = count, chars = text.len(), "ingested document");
        Ok(count)
    }

    /// Answers `question` from the ingested document.
    ///
    /// Returns [`NO_INFORMATION_ANSWER`] without calling the generator when the
    /// index is empty. Generator failures come back as [`RagError::Generation`].
    pub fn answer(&self, question: &str) -> RagResult<String> {
        let hits = self.retrieve(question)?;
        if hits.is_empty() {
            tracing::debug!("index empty; returning no-information answer");
            return Ok(NO_INFORMATION_ANSWER.to_string());
        }

        let chunks: Vec<String> = hits.into_iter().map(|hit| hit.text).collect();
        let context = build_context(&chunks);
        let prompt = build_prompt(question, &context);
        self.generator
            .generate(SYSTEM_INSTRUCTION, &prompt)
            .inspect_err(|err| tracing::warn!(error = %err, "answer generation failed"))
    }

    /// Embeds `question` and returns the top-k hits without generating.
    pub fn retrieve(&self, question: &str) -> RagResult<Vec<SearchHit>> {
        if question.trim().is_empty() {
            return Err(RagError::EmptyQuestion);
        }
        let mut vectors = self.embed_texts(&[question])?;
        if vectors.len() != 1 {
            return Err(RagError::Embedding(format!(
                "expected one embedding for the question, got {}",
                vectors.len()
            )));
        }
        let query = vectors.remove(0);
        let hits = self.index.search_scored(&query, self.top_k)?;
        tracing::debug!(hits = hits.len(), top_k = self.top_k, "retrieved chunks");
        Ok(hits)
    }

    /// Drops the ingested document.
    pub fn clear(&self) {
        self.index.clear();
        tracing::info!("cleared vector index");
    }

    /// Chunks held by the current index generation.
    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    fn embed_texts(&self, texts: &[&str]) -> RagResult<Vec<Embedding>> {
        self.embedder.embed(texts)
    }
}

/// Joins retrieved chunks, in rank order, with a blank line.
pub fn build_context(chunks: &[String]) -> String {
    chunks.join("\n\n")
}

/// Prompt asking for an answer grounded only in `context`.
pub fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Answer the question based on the following context. If the answer is not in the context, say so.\n\n\
         Context:\n{context}\n\n\
         Question: {question}\n\n\
         Answer:"
    )
}
