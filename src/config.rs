//! Configuration for the RAG core.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::DEFAULT_TOP_K;
use crate::error::{RagError, Result};

/// Process-wide configuration, fixed at startup.
///
/// Only `k` is mutable per request (caller-supplied per query); everything
/// else is read once when the pipelines are constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Embedding model identifier.
    pub embed_model: String,
    /// Generation model identifier.
    pub generate_model: String,
    /// Base URL of the model server.
    pub base_url: String,
    /// Snapshot path for best-effort store persistence. `None` disables it.
    pub persist_path: Option<PathBuf>,
    /// Default number of chunks retrieved per query.
    pub default_k: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embed_model: "all-minilm".to_string(),
            generate_model: "llama3.2".to_string(),
            base_url: "http://localhost:11434".to_string(),
            persist_path: None,
            default_k: DEFAULT_TOP_K,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a configuration from the environment.
    ///
    /// Honors `OLLAMA_EMBED_MODEL`, `OLLAMA_LLM_MODEL`, `OLLAMA_HOST`, and
    /// `RAG_PERSIST_PATH`; unset variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("OLLAMA_EMBED_MODEL") {
            config.embed_model = model;
        }
        if let Ok(model) = std::env::var("OLLAMA_LLM_MODEL") {
            config.generate_model = model;
        }
        if let Ok(host) = std::env::var("OLLAMA_HOST") {
            config.base_url = host;
        }
        if let Ok(path) = std::env::var("RAG_PERSIST_PATH") {
            config.persist_path = Some(PathBuf::from(path));
        }
        config
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the embedding model identifier.
    pub fn embed_model(mut self, model: impl Into<String>) -> Self {
        self.config.embed_model = model.into();
        self
    }

    /// Set the generation model identifier.
    pub fn generate_model(mut self, model: impl Into<String>) -> Self {
        self.config.generate_model = model.into();
        self
    }

    /// Set the model server base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the store snapshot path.
    pub fn persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.persist_path = Some(path.into());
        self
    }

    /// Set the default number of chunks retrieved per query.
    pub fn default_k(mut self, k: usize) -> Self {
        self.config.default_k = k;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `default_k == 0`
    /// - `embed_model` or `generate_model` is empty
    pub fn build(self) -> Result<RagConfig> {
        if self.config.default_k == 0 {
            return Err(RagError::Config("default_k must be greater than zero".to_string()));
        }
        if self.config.embed_model.is_empty() {
            return Err(RagError::Config("embed_model must not be empty".to_string()));
        }
        if self.config.generate_model.is_empty() {
            return Err(RagError::Config("generate_model must not be empty".to_string()));
        }
        Ok(self.config)
    }
}
