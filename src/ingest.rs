//! Ingestion pipeline: decode → segment → embed → upsert → persist.
//!
//! The [`IngestPipeline`] coordinates the producer side of the RAG core for
//! one uploaded document, composing a [`Segmenter`], an
//! [`EmbeddingProvider`], and a [`VectorStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{IngestPipeline, MemoryVectorStore, OllamaClient};
//!
//! let client = Arc::new(OllamaClient::new());
//! let pipeline = IngestPipeline::builder()
//!     .embedding_provider(client)
//!     .vector_store(Arc::new(MemoryVectorStore::new()))
//!     .build()?;
//!
//! let inserted = pipeline.ingest("notes.txt", &bytes).await?;
//! ```

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::document::ChunkMetadata;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::segmenter::{Segmenter, SentenceSegmenter};
use crate::store::VectorStore;

/// A chunk that embedded successfully and is ready to upsert.
struct EmbeddedChunk {
    id: String,
    text: String,
    metadata: ChunkMetadata,
    embedding: Vec<f32>,
}

/// The document ingestion pipeline.
///
/// Processes one uploaded document per [`ingest`](IngestPipeline::ingest)
/// call. Embedding failures are isolated per chunk: a failed chunk is logged
/// and dropped, and the remaining chunks are still inserted. Construct one
/// via [`IngestPipeline::builder()`].
pub struct IngestPipeline {
    segmenter: Arc<dyn Segmenter>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for IngestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestPipeline").finish_non_exhaustive()
    }
}

impl IngestPipeline {
    /// Create a new [`IngestPipelineBuilder`].
    pub fn builder() -> IngestPipelineBuilder {
        IngestPipelineBuilder::default()
    }

    /// Ingest one document: decode → segment → embed → upsert → persist.
    ///
    /// `raw_bytes` is decoded as UTF-8 with invalid sequences replaced, so a
    /// corrupt byte never aborts ingestion of an otherwise valid document.
    /// Each chunk gets a fresh UUID and `{source: filename}` metadata.
    ///
    /// Returns the number of chunks actually inserted, which may be less
    /// than the number of segmented sentences if some chunks failed to
    /// embed.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyDocument`] if segmentation yields zero chunks.
    /// - [`RagError::NoEmbeddings`] if every chunk failed to embed; nothing
    ///   is upserted in that case.
    /// - [`RagError::Store`] / [`RagError::Alignment`] if the batch upsert
    ///   fails.
    ///
    /// A failed durable persist is logged as a warning and does not fail
    /// the call: the in-memory view of the store stays consistent even when
    /// the flush lags or fails.
    pub async fn ingest(&self, filename: &str, raw_bytes: &[u8]) -> Result<usize> {
        let text = String::from_utf8_lossy(raw_bytes);

        let sentences = self.segmenter.segment(&text);
        if sentences.is_empty() {
            return Err(RagError::EmptyDocument);
        }
        let attempted = sentences.len();
        info!(filename, sentences = attempted, "ingesting document");

        // Per-item embedding outcomes, collected then partitioned so one
        // failed chunk never aborts the rest.
        let mut outcomes = Vec::with_capacity(attempted);
        for sentence in sentences {
            let outcome = self.embedding_provider.embed(&sentence).await;
            outcomes.push((sentence, outcome));
        }

        let mut embedded = Vec::with_capacity(attempted);
        let mut dropped = 0usize;
        for (sentence, outcome) in outcomes {
            match outcome {
                Ok(embedding) => embedded.push(EmbeddedChunk {
                    id: Uuid::new_v4().to_string(),
                    text: sentence,
                    metadata: ChunkMetadata::from_source(filename),
                    embedding,
                }),
                Err(e) => {
                    warn!(filename, error = %e, "dropping chunk that failed to embed");
                    dropped += 1;
                }
            }
        }

        if embedded.is_empty() {
            return Err(RagError::NoEmbeddings { attempted });
        }

        let ids: Vec<String> = embedded.iter().map(|c| c.id.clone()).collect();
        let documents: Vec<String> = embedded.iter().map(|c| c.text.clone()).collect();
        let metadatas: Vec<ChunkMetadata> = embedded.iter().map(|c| c.metadata.clone()).collect();
        let embeddings: Vec<Vec<f32>> = embedded.into_iter().map(|c| c.embedding).collect();

        self.vector_store.upsert(&ids, &documents, &metadatas, &embeddings).await?;

        // Durability is best-effort: a failed flush is a warning, not an
        // ingestion failure.
        if let Err(e) = self.vector_store.persist().await {
            warn!(filename, error = %e, "store persist failed");
        }

        let inserted = ids.len();
        info!(filename, inserted, dropped, "ingested document");
        Ok(inserted)
    }
}

/// Builder for constructing an [`IngestPipeline`].
///
/// The embedding provider and vector store are required; the segmenter
/// defaults to [`SentenceSegmenter`].
#[derive(Default)]
pub struct IngestPipelineBuilder {
    segmenter: Option<Arc<dyn Segmenter>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl IngestPipelineBuilder {
    /// Set the segmenter. Defaults to [`SentenceSegmenter`] if unset.
    pub fn segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

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

    /// Build the [`IngestPipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing.
    pub fn build(self) -> Result<IngestPipeline> {
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let segmenter = self.segmenter.unwrap_or_else(|| Arc::new(SentenceSegmenter));

        Ok(IngestPipeline { segmenter, embedding_provider, vector_store })
    }
}
