//! # ragkit
//!
//! A minimal retrieval-augmented generation core: documents are segmented,
//! embedded, and indexed on the producer side; user questions are embedded,
//! matched against stored chunks, and answered with grounded, cited model
//! output on the consumer side.
//!
//! ## Overview
//!
//! The crate is organized around three injected capabilities —
//! [`EmbeddingProvider`], [`VectorStore`], and [`AnswerGenerator`] — and two
//! orchestrators that compose them:
//!
//! - [`IngestPipeline`] — decode → segment → embed → upsert, once per
//!   uploaded document, with per-chunk embedding-failure isolation.
//! - [`QueryEngine`] — embed → retrieve → assemble context → generate, once
//!   per user question, producing an [`Answer`] with ordered sources.
//!
//! Both sides share the embedding provider and vector store but never
//! depend on each other. Transport concerns (HTTP routing, upload decoding,
//! UI) belong to the caller.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragkit::{IngestPipeline, MemoryVectorStore, OllamaClient, QueryEngine, RagConfig};
//!
//! let config = RagConfig::from_env();
//! let client = Arc::new(OllamaClient::from_config(&config));
//! let store = Arc::new(match &config.persist_path {
//!     Some(path) => MemoryVectorStore::open(path).await,
//!     None => MemoryVectorStore::new(),
//! });
//!
//! let pipeline = IngestPipeline::builder()
//!     .embedding_provider(client.clone())
//!     .vector_store(store.clone())
//!     .build()?;
//! let engine = QueryEngine::builder()
//!     .embedding_provider(client.clone())
//!     .vector_store(store)
//!     .generator(client)
//!     .default_k(config.default_k)
//!     .build()?;
//!
//! pipeline.ingest("notes.txt", b"Hello world. How are you?").await?;
//! let answer = engine.answer("What was said?", None).await?;
//! ```

pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod ollama;
pub mod segmenter;
pub mod store;

pub use config::RagConfig;
pub use document::{Answer, Chunk, ChunkMetadata, Health, QueryResult, SourceRef};
pub use embedding::EmbeddingProvider;
pub use engine::{DEFAULT_TOP_K, QueryEngine, QueryEngineBuilder};
pub use error::{RagError, Result};
pub use generation::AnswerGenerator;
pub use ingest::{IngestPipeline, IngestPipelineBuilder};
pub use ollama::OllamaClient;
pub use segmenter::{Segmenter, SentenceSegmenter};
pub use store::{MemoryVectorStore, VectorStore, align_batch};
