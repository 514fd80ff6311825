//! Ollama provider for embeddings and answer generation.
//!
//! Wraps a local Ollama server's `/api/embeddings` and `/api/generate`
//! endpoints behind the [`EmbeddingProvider`] and [`AnswerGenerator`] traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::{AnswerGenerator, build_prompt};

/// The default Ollama server address.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// The default embedding model.
const DEFAULT_EMBED_MODEL: &str = "all-minilm";

/// The default generation model.
const DEFAULT_GENERATE_MODEL: &str = "llama3.2";

/// Embedding dimensionality of `all-minilm`.
const DEFAULT_DIMENSIONS: usize = 384;

/// An Ollama-backed [`EmbeddingProvider`] and [`AnswerGenerator`].
///
/// Uses `reqwest` to call the server directly. Generation is a single
/// non-streamed call (`"stream": false`); the flat grounding prompt is built
/// by [`build_prompt`]. No timeout is imposed here — timeout policy belongs
/// to the caller or a customized `reqwest::Client`.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::OllamaClient;
///
/// let client = OllamaClient::new().with_embed_model("nomic-embed-text", 768);
/// let embedding = client.embed("hello world").await?;
/// ```
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    embed_model: String,
    generate_model: String,
    dimensions: usize,
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaClient {
    /// Create a client for a local Ollama server with the default models.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            generate_model: DEFAULT_GENERATE_MODEL.to_string(),
            dimensions: DEFAULT_DIMENSIONS,
        }
    }

    /// Create a client from a [`RagConfig`].
    ///
    /// Dimensionality stays at the `all-minilm` default unless overridden
    /// with [`with_embed_model`](OllamaClient::with_embed_model).
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new()
            .with_base_url(&config.base_url)
            .with_embed_model(&config.embed_model, DEFAULT_DIMENSIONS)
            .with_generate_model(&config.generate_model)
    }

    /// Set the server base URL (e.g. `http://ollama:11434`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the embedding model and the dimensionality it produces.
    pub fn with_embed_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.embed_model = model.into();
        self.dimensions = dimensions;
        self
    }

    /// Set the generation model.
    pub fn with_generate_model(mut self, model: impl Into<String>) -> Self {
        self.generate_model = model.into();
        self
    }

    fn embed_error(&self, message: String) -> RagError {
        RagError::Embedding { provider: "Ollama".to_string(), message }
    }

    fn generate_error(&self, message: String) -> RagError {
        RagError::Generation { provider: "Ollama".to_string(), message }
    }
}

// ── Ollama API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

// ── Capability implementations ─────────────────────────────────────

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Ollama", model = %self.embed_model, text_len = text.len(), "embedding text");

        let request = EmbeddingsRequest { model: &self.embed_model, prompt: text };
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "embeddings request failed");
                self.embed_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Ollama", %status, "embeddings API error");
            return Err(self.embed_error(format!("API returned {status}: {body}")));
        }

        let parsed: EmbeddingsResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse embeddings response");
            self.embed_error(format!("failed to parse response: {e}"))
        })?;

        if parsed.embedding.is_empty() {
            return Err(self.embed_error("API returned an empty embedding".to_string()));
        }

        Ok(parsed.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[async_trait]
impl AnswerGenerator for OllamaClient {
    async fn generate_answer(&self, context: &str, query: &str) -> Result<String> {
        let prompt = build_prompt(context, query);
        debug!(
            provider = "Ollama",
            model = %self.generate_model,
            prompt_len = prompt.len(),
            "generating answer"
        );

        let request =
            GenerateRequest { model: &self.generate_model, prompt: &prompt, stream: false };
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Ollama", error = %e, "generate request failed");
                self.generate_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(provider = "Ollama", %status, "generate API error");
            return Err(self.generate_error(format!("API returned {status}: {body}")));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = "Ollama", error = %e, "failed to parse generate response");
            self.generate_error(format!("failed to parse response: {e}"))
        })?;

        Ok(parsed.response)
    }
}
