use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::{AnswerGenerator, GenerationSettings};
use crate::error::{RagError, RagResult};

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiGenerator {
    api_key: String,
    model: String,
    endpoint: String,
    settings: GenerationSettings,
    client: Client,
}

impl OpenAiGenerator {
    /// Builds a client that posts to `{base_url}/chat/completions`.
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing OpenAI API key");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build OpenAI HTTP client")?;
        Ok(Self {
            api_key,
            model,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            settings,
            client,
        })
    }

    fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid OpenAI API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let body = ChatRequest {
            model: &self.model,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .context("failed to call OpenAI chat completions")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("OpenAI returned {}: {}", status, text);
        }
        let parsed: ChatResponse = resp.json().context("failed to parse OpenAI response")?;
        parsed.first_content()
    }
}

impl AnswerGenerator for OpenAiGenerator {
    fn generate(&self, system_instruction: &str, user_prompt: &str) -> RagResult<String> {
        self.complete(system_instruction, user_prompt)
            .map_err(|err| RagError::Generation(format!("{err:#}")))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn first_content(self) -> Result<String> {
        match self.choices.into_iter().find_map(|choice| choice.message.content) {
            Some(content) => Ok(content),
            None => bail!("OpenAI response missing message content"),
        }
    }
}
