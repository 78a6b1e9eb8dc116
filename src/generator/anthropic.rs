use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::{AnswerGenerator, GenerationSettings};
use crate::error::{RagError, RagResult};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// Messages-API client for Anthropic models.
pub struct AnthropicGenerator {
    api_key: String,
    model: String,
    settings: GenerationSettings,
    client: Client,
}

impl AnthropicGenerator {
    /// Builds a new Anthropic client.
    pub fn new(
        api_key: String,
        model: String,
        settings: GenerationSettings,
        timeout: Duration,
    ) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing Anthropic API key");
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Anthropic HTTP client")?;
        Ok(Self {
            api_key,
            model,
            settings,
            client,
        })
    }

    fn complete(&self, system_instruction: &str, user_prompt: &str) -> Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(self.api_key.trim()).context("invalid Anthropic API key")?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            system: system_instruction,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![AnthropicContentBlock {
                    kind: "text",
                    text: user_prompt,
                }],
            }],
        };
        let resp = self
            .client
            .post(MESSAGES_URL)
            .headers(headers)
            .json(&body)
            .send()
            .context("failed to call Anthropic messages API")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            bail!("Anthropic returned {}: {}", status, text);
        }
        let parsed: AnthropicResponse =
            resp.json().context("failed to parse Anthropic response")?;
        parsed.joined_text()
    }
}

impl AnswerGenerator for AnthropicGenerator {
    fn generate(&self, system_instruction: &str, user_prompt: &str) -> RagResult<String> {
        self.complete(system_instruction, user_prompt)
            .map_err(|err| RagError::Generation(format!("{err:#}")))
    }
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    temperature: f32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<AnthropicContentBlock<'a>>,
}

#[derive(Serialize)]
struct AnthropicContentBlock<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicResponseBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicResponseBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl AnthropicResponse {
    fn joined_text(self) -> Result<String> {
        let answer = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicResponseBlock::Text { text } => Some(text),
                AnthropicResponseBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");
        if answer.is_empty() {
            bail!("Anthropic response missing text content");
        }
        Ok(answer)
    }
}
