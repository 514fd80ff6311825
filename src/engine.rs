//! Retrieval-augmented query engine: embed → retrieve → assemble → generate.
//!
//! The [`QueryEngine`] is the consumer side of the RAG core: it turns one
//! user question into contextualized model input and a cited [`Answer`].
//! It composes an [`EmbeddingProvider`], a [`VectorStore`], and an
//! [`AnswerGenerator`], and shares the first two with the ingestion
//! pipeline without depending on it.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{MemoryVectorStore, OllamaClient, QueryEngine};
//!
//! let client = Arc::new(OllamaClient::new());
//! let engine = QueryEngine::builder()
//!     .embedding_provider(client.clone())
//!     .vector_store(Arc::new(MemoryVectorStore::new()))
//!     .generator(client)
//!     .build()?;
//!
//! let answer = engine.answer("What did we decide?", None).await?;
//! ```

use std::sync::Arc;

use tracing::info;

use crate::document::{Answer, Health, QueryResult, SourceRef};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::AnswerGenerator;
use crate::store::VectorStore;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Separator line between context blocks handed to the model.
const CONTEXT_SEPARATOR: &str = "\n---\n";

/// The retrieval-augmented query engine.
///
/// Each [`answer`](QueryEngine::answer) call is processed independently and
/// runs to completion; there is no per-item recovery — a failure in
/// embedding, retrieval, or generation aborts the whole query, since a query
/// has exactly one embedding and one generation call.
pub struct QueryEngine {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    generator: Arc<dyn AnswerGenerator>,
    default_k: usize,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("default_k", &self.default_k)
            .finish_non_exhaustive()
    }
}

/// Render retrieved chunks into the grounding context string.
///
/// Each chunk becomes a `Source: <source or "unknown">` block followed by
/// its text, joined by a `---` separator line in retrieval order. An empty
/// retrieval set yields an empty string — a valid state, not an error.
fn assemble_context(results: &[QueryResult]) -> String {
    results
        .iter()
        .map(|r| format!("Source: {}\n{}", r.chunk.metadata.source_label(), r.chunk.text))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

impl QueryEngine {
    /// Create a new [`QueryEngineBuilder`].
    pub fn builder() -> QueryEngineBuilder {
        QueryEngineBuilder::default()
    }

    /// Answer one user question from the stored corpus.
    ///
    /// Embeds the query, retrieves the `k` nearest chunks (the configured
    /// default when `None`), assembles their grounding context, and invokes
    /// the generator once. The response carries the generated answer plus
    /// one [`SourceRef`] per retrieved chunk, nearest first.
    ///
    /// An empty store is not an error: generation still runs with empty
    /// context and the model is expected to state the limitation.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyQuery`] if `query_text` trims to nothing; checked
    ///   before any embedding call is made.
    /// - [`RagError::Embedding`], [`RagError::Store`], or
    ///   [`RagError::Generation`] propagated from the respective step; no
    ///   partial answer is returned.
    pub async fn answer(&self, query_text: &str, k: Option<usize>) -> Result<Answer> {
        let results = self.retrieve(query_text, k).await?;

        let context = assemble_context(&results);
        info!(
            query_len = query_text.len(),
            retrieved = results.len(),
            context_len = context.len(),
            "generating grounded answer"
        );

        let answer = self.generator.generate_answer(&context, query_text.trim()).await?;
        let sources: Vec<SourceRef> = results.iter().map(SourceRef::from).collect();

        Ok(Answer { answer, sources })
    }

    /// Retrieve the `k` nearest chunks for a query without generating.
    ///
    /// Results are ordered by ascending distance. Retrieval ordering is
    /// deterministic for an identical query against an unchanged store.
    ///
    /// # Errors
    ///
    /// [`RagError::EmptyQuery`] on blank input; otherwise propagates
    /// embedding or store failures.
    pub async fn retrieve(&self, query_text: &str, k: Option<usize>) -> Result<Vec<QueryResult>> {
        let query = query_text.trim();
        if query.is_empty() {
            return Err(RagError::EmptyQuery);
        }
        let k = k.unwrap_or(self.default_k);

        let query_embedding = self.embedding_provider.embed(query).await?;
        self.vector_store.query(&query_embedding, k).await
    }

    /// Liveness signal for the `health` boundary operation.
    pub fn health(&self) -> Health {
        Health::ok()
    }
}

/// Builder for constructing a [`QueryEngine`].
///
/// Embedding provider, vector store, and generator are required; `default_k`
/// defaults to [`DEFAULT_TOP_K`].
#[derive(Default)]
pub struct QueryEngineBuilder {
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    generator: Option<Arc<dyn AnswerGenerator>>,
    default_k: Option<usize>,
}

impl QueryEngineBuilder {
    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the answer generator.
    pub fn generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the default number of chunks retrieved per query.
    pub fn default_k(mut self, k: usize) -> Self {
        self.default_k = Some(k);
        self
    }

    /// Build the [`QueryEngine`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing or
    /// `default_k` is zero.
    pub fn build(self) -> Result<QueryEngine> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| RagError::Config("generator is required".to_string()))?;
        let default_k = self.default_k.unwrap_or(DEFAULT_TOP_K);
        if default_k == 0 {
            return Err(RagError::Config("default_k must be greater than zero".to_string()));
        }

        Ok(QueryEngine { embedding_provider, vector_store, generator, default_k })
    }
}
