//! OpenAI-based embedding client implementation.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::Embedder;
use crate::error::{RagError, RagResult};
use crate::vector_index::Embedding;

/// Largest input array the embeddings endpoint accepts per request.
pub const MAX_PROVIDER_BATCH: usize = 2048;

/// Blocking embeddings client that talks to OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    max_retries: usize,
    batch_size: usize,
}

impl OpenAiEmbedder {
    /// Builds a new OpenAI embeddings client.
    pub fn new(
        api_key: String,
        base_url: String,
        model: String,
        dimensions: Option<usize>,
        timeout: Duration,
        max_retries: usize,
        batch_size: usize,
    ) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing OpenAI API key");
        anyhow::ensure!(!model.trim().is_empty(), "missing OpenAI model name");
        let mut headers = reqwest::header::HeaderMap::new();
        let auth = format!("Bearer {}", api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).context("invalid OpenAI API key")?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("failed to build OpenAI HTTP client")?;
        let endpoint = format!("{}/embeddings", base_url.trim_end_matches('/'));
        Ok(Self {
            client,
            endpoint,
            model,
            dimensions,
            max_retries: max_retries.max(1),
            batch_size: batch_size.clamp(1, MAX_PROVIDER_BATCH),
        })
    }

    /// Embeds every input, issuing one request per `batch_size` slice.
    pub fn embed_all(&self, inputs: &[&str]) -> Result<Vec<Embedding>> {
        let mut out = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.batch_size) {
            out.extend(self.embed_batch(batch)?);
        }
        Ok(out)
    }

    /// Sends a batch of strings to OpenAI and returns embedding vectors.
    pub fn embed_batch(&self, inputs: &[&str]) -> Result<Vec<Embedding>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        anyhow::ensure!(
            inputs.len() <= self.batch_size,
            "batch of {} exceeds configured max {}",
            inputs.len(),
            self.batch_size
        );

        let mut attempt = 0usize;
        loop {
            let request = EmbeddingRequest {
                model: &self.model,
                input: inputs,
                dimensions: self.dimensions,
            };
            let response = self.client.post(&self.endpoint).json(&request).send();
            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let parsed: EmbeddingResponse = resp
                            .json()
                            .context("failed to parse OpenAI embedding response")?;
                        return parsed.into_ordered(inputs.len());
                    }

                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        tracing::warn!(%status, attempt, "retrying OpenAI embeddings request");
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    anyhow::bail!("OpenAI embeddings request failed ({}): {}", status, body);
                }
                Err(err) => {
                    if is_retryable_error(&err) && attempt + 1 < self.max_retries {
                        attempt += 1;
                        tracing::warn!(error = %err, attempt, "retrying OpenAI embeddings request");
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(err).context("failed to call OpenAI embeddings");
                }
            }
        }
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed(&self, batch: &[&str]) -> RagResult<Vec<Embedding>> {
        self.embed_all(batch)
            .map_err(|err| RagError::Embedding(format!("{err:#}")))
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_body() || err.is_request() || err.is_decode()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(500 * (1 << capped))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Embedding,
    index: usize,
}

impl EmbeddingResponse {
    /// Restores input order (rows carry their input `index`).
    fn into_ordered(mut self, expected: usize) -> Result<Vec<Embedding>> {
        self.data.sort_by_key(|entry| entry.index);
        anyhow::ensure!(
            self.data.len() == expected,
            "OpenAI returned {} embeddings for {} inputs",
            self.data.len(),
            expected
        );
        Ok(self.data.into_iter().map(|entry| entry.embedding).collect())
    }
}
