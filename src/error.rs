//! Error types for the `ragkit` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The upstream embedding capability failed.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The upstream generation capability failed.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector store backend failed.
    #[error("Vector store error ({backend}): {message}")]
    Store {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Batch arrays handed to the store were not positionally aligned.
    #[error(
        "Misaligned upsert batch: {ids} ids, {documents} documents, \
         {metadatas} metadatas, {embeddings} embeddings"
    )]
    Alignment {
        /// Number of ids in the batch.
        ids: usize,
        /// Number of document texts in the batch.
        documents: usize,
        /// Number of metadata records in the batch.
        metadatas: usize,
        /// Number of embedding vectors in the batch.
        embeddings: usize,
    },

    /// A document contained no segmentable text.
    #[error("Document contains no segmentable text")]
    EmptyDocument,

    /// Every chunk of a document failed to embed, leaving nothing to insert.
    #[error("All {attempted} chunks failed to embed; nothing to insert")]
    NoEmbeddings {
        /// Number of chunks for which embedding was attempted.
        attempted: usize,
    },

    /// The query text was empty or whitespace-only.
    #[error("Query text must not be empty")]
    EmptyQuery,

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
