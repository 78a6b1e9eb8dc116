//! Answer-generation providers.

use crate::error::{RagError, RagResult};

mod anthropic;
mod openai;

pub use anthropic::AnthropicGenerator;
pub use openai::OpenAiGenerator;

/// Trait implemented by concrete LLM providers.
pub trait AnswerGenerator: Send + Sync {
    /// Returns the model's text for `user_prompt` under `system_instruction`.
    fn generate(&self, system_instruction: &str, user_prompt: &str) -> RagResult<String>;
}

/// Stand-in for retrieval-only pipelines; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

impl AnswerGenerator for DisabledGenerator {
    fn generate(&self, _system_instruction: &str, _user_prompt: &str) -> RagResult<String> {
        Err(RagError::Generation(
            "answer generation is disabled for this pipeline".to_string(),
        ))
    }
}

/// Sampling settings shared by the various providers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum completion tokens.
    pub max_tokens: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}
