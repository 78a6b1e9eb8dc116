//! Command-line and environment configuration shared by the binaries.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};

use crate::chunker::ChunkingConfig;
use crate::embedder::{Embedder, OpenAiEmbedder};
use crate::extract::TextExtractor;
use crate::generator::{
    AnswerGenerator, AnthropicGenerator, DisabledGenerator, GenerationSettings, OpenAiGenerator,
};
use crate::pipeline::{PipelineConfig, RetrievalPipeline};

/// Chunking and retrieval knobs.
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Maximum characters per chunk
    #[arg(long, env = "PDFCHAT_CHUNK_SIZE", default_value_t = 500)]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[arg(long, env = "PDFCHAT_CHUNK_OVERLAP", default_value_t = 100)]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, env = "PDFCHAT_TOP_K", default_value_t = 5)]
    pub top_k: usize,

    /// Embedding width produced by the embedding model
    #[arg(long, env = "PDFCHAT_EMBEDDING_DIMENSIONS", default_value_t = 1536)]
    pub dimensions: usize,
}

impl PipelineArgs {
    /// Converts the parsed flags into a `PipelineConfig`.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            chunking: ChunkingConfig {
                max_len: self.chunk_size,
                overlap: self.chunk_overlap,
            },
            top_k: self.top_k,
            dimensions: self.dimensions,
        }
    }
}

/// Supported answer-generation backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LlmProviderArg {
    /// OpenAI-compatible chat completions (default).
    Openai,
    /// Anthropic messages API.
    Anthropic,
}

/// Credentials and model selection for the external providers.
#[derive(Args, Debug, Clone)]
pub struct ProviderArgs {
    /// OpenAI API key (embeddings, and answers with the openai provider)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL for OpenAI-compatible endpoints
    #[arg(
        long,
        env = "PDFCHAT_OPENAI_BASE",
        default_value = "https://api.openai.com/v1"
    )]
    pub openai_base_url: String,

    /// Embedding model identifier
    #[arg(
        long,
        env = "PDFCHAT_EMBEDDING_MODEL",
        default_value = "text-embedding-ada-002"
    )]
    pub embedding_model: String,

    /// Optional `dimensions` parameter sent with embedding requests
    #[arg(long, env = "PDFCHAT_REQUEST_DIMENSIONS")]
    pub request_dimensions: Option<usize>,

    /// Max inputs per embedding HTTP request
    #[arg(long, env = "PDFCHAT_EMBEDDING_BATCH", default_value_t = 2048)]
    pub embedding_batch_size: usize,

    /// Seconds before embedding requests time out
    #[arg(long, env = "PDFCHAT_EMBEDDING_TIMEOUT_SECS", default_value_t = 30)]
    pub embedding_timeout_secs: u64,

    /// Retry attempts for transient embedding errors
    #[arg(long, env = "PDFCHAT_MAX_RETRIES", default_value_t = 5)]
    pub max_retries: usize,

    /// Answer-generation backend
    #[arg(long, env = "PDFCHAT_LLM_PROVIDER", value_enum, default_value_t = LlmProviderArg::Openai)]
    pub llm_provider: LlmProviderArg,

    /// OpenAI chat model used for answers
    #[arg(long, env = "PDFCHAT_CHAT_MODEL", default_value = "gpt-4")]
    pub chat_model: String,

    /// Anthropic API key (required with --llm-provider anthropic)
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    pub anthropic_api_key: Option<String>,

    /// Anthropic model identifier
    #[arg(
        long,
        env = "PDFCHAT_ANTHROPIC_MODEL",
        default_value = "claude-3-sonnet-20240229"
    )]
    pub anthropic_model: String,

    /// Sampling temperature for the answer model
    #[arg(long, default_value_t = 0.7)]
    pub temperature: f32,

    /// Maximum tokens to request from the answer model
    #[arg(long, default_value_t = 500)]
    pub max_completion_tokens: usize,

    /// Seconds before answer requests time out
    #[arg(long, env = "PDFCHAT_GENERATION_TIMEOUT_SECS", default_value_t = 60)]
    pub generation_timeout_secs: u64,
}

impl ProviderArgs {
    /// Builds the OpenAI embeddings client.
    pub fn build_embedder(&self) -> Result<OpenAiEmbedder> {
        let key = required_key(&self.openai_api_key, "OPENAI_API_KEY", "embeddings")?;
        OpenAiEmbedder::new(
            key,
            self.openai_base_url.clone(),
            self.embedding_model.clone(),
            self.request_dimensions,
            Duration::from_secs(self.embedding_timeout_secs.max(1)),
            self.max_retries.max(1),
            self.embedding_batch_size.max(1),
        )
    }

    /// Builds the configured answer generator.
    pub fn build_generator(&self) -> Result<Arc<dyn AnswerGenerator>> {
        let settings = GenerationSettings {
            temperature: self.temperature,
            max_tokens: self.max_completion_tokens,
        };
        let timeout = Duration::from_secs(self.generation_timeout_secs.max(1));
        let key = self.generator_key()?;
        let generator: Arc<dyn AnswerGenerator> = match self.llm_provider {
            LlmProviderArg::Openai => Arc::new(OpenAiGenerator::new(
                key,
                &self.openai_base_url,
                self.chat_model.clone(),
                settings,
                timeout,
            )?),
            LlmProviderArg::Anthropic => Arc::new(AnthropicGenerator::new(
                key,
                self.anthropic_model.clone(),
                settings,
                timeout,
            )?),
        };
        Ok(generator)
    }

    fn generator_key(&self) -> Result<String> {
        match self.llm_provider {
            LlmProviderArg::Openai => {
                required_key(&self.openai_api_key, "OPENAI_API_KEY", "the OpenAI provider")
            }
            LlmProviderArg::Anthropic => required_key(
                &self.anthropic_api_key,
                "ANTHROPIC_API_KEY",
                "the Anthropic provider",
            ),
        }
    }
}

fn required_key(key: &Option<String>, var: &str, purpose: &str) -> Result<String> {
    key.as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("{var} must be set for {purpose}"))
}

/// Wires the real providers and `extractor` into a question-answering pipeline.
pub fn build_pipeline(
    pipeline: &PipelineArgs,
    providers: &ProviderArgs,
    extractor: Arc<dyn TextExtractor>,
) -> Result<RetrievalPipeline> {
    assemble(pipeline, providers, extractor, true)
}

/// Like [`build_pipeline`] but without an answer model; only the embedding
/// credentials are required.
pub fn build_retrieval_pipeline(
    pipeline: &PipelineArgs,
    providers: &ProviderArgs,
    extractor: Arc<dyn TextExtractor>,
) -> Result<RetrievalPipeline> {
    assemble(pipeline, providers, extractor, false)
}

fn assemble(
    pipeline: &PipelineArgs,
    providers: &ProviderArgs,
    extractor: Arc<dyn TextExtractor>,
    answers: bool,
) -> Result<RetrievalPipeline> {
    // Every check runs before the first HTTP client exists: dropping a blocking
    // client on an async worker panics, so a late failure must not drop one.
    let config = pipeline.pipeline_config();
    config.validate().context("invalid pipeline configuration")?;
    if answers {
        providers.generator_key()?;
    }

    let embedder: Arc<dyn Embedder> = Arc::new(providers.build_embedder()?);
    let generator = if answers {
        providers.build_generator()?
    } else {
        Arc::new(DisabledGenerator)
    };
    RetrievalPipeline::new(config, extractor, embedder, generator)
        .context("invalid pipeline configuration")
}
