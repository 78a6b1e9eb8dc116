#![warn(missing_docs)]
//! Core library entry points for pdfchat: chunk a document, embed and index
//! the chunks, and answer questions from the nearest ones.

pub mod chunker;
pub mod config;
pub mod embedder;
pub mod error;
pub mod extract;
pub mod generator;
pub mod logging;
pub mod pipeline;
pub mod server;
pub mod vector_index;

pub use chunker::{chunk_text, Chunk, Chunker, ChunkingConfig};
pub use config::{
    build_pipeline, build_retrieval_pipeline, LlmProviderArg, PipelineArgs, ProviderArgs,
};
pub use embedder::{Embedder, OpenAiEmbedder};
pub use error::{RagError, RagResult};
pub use extract::{extractor_for_path, PdfExtractor, PlainTextExtractor, TextExtractor};
pub use generator::{
    AnswerGenerator, AnthropicGenerator, DisabledGenerator, GenerationSettings, OpenAiGenerator,
};
pub use pipeline::{
    build_context, build_prompt, PipelineConfig, RetrievalPipeline, DEFAULT_TOP_K,
    NO_INFORMATION_ANSWER, SYSTEM_INSTRUCTION,
};
pub use server::{router, AppState, ServerSettings};
pub use vector_index::{squared_euclidean, Embedding, SearchHit, VectorIndex, DEFAULT_DIMENSIONS};
