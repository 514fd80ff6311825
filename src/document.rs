//! Data types for chunks, retrieval matches, and answers.

use serde::{Deserialize, Serialize};

/// Provenance metadata attached to a [`Chunk`] at ingestion time.
///
/// Stored alongside the chunk and echoed back in query results so callers
/// can attribute an answer to its originating document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkMetadata {
    /// Provenance label, typically the originating filename.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ChunkMetadata {
    /// Metadata carrying only a source label.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self { source: Some(source.into()) }
    }

    /// The source label, or `"unknown"` if none was recorded.
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or("unknown")
    }
}

/// A unit of retrievable text with its vector embedding.
///
/// Chunks are created during ingestion, one per segmented sentence, and are
/// durable thereafter: the core defines no delete or update operation, and an
/// embedding is never recomputed unless the document is re-ingested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, generated at ingestion time, never reused.
    pub id: String,
    /// The literal retrievable text.
    pub text: String,
    /// Provenance metadata.
    pub metadata: ChunkMetadata,
    /// Fixed-dimension embedding vector produced at ingestion.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] paired with its distance from the query vector.
///
/// Smaller distance means more similar. Replaces the positional
/// ids/documents/metadatas/distances arrays that nearest-neighbor backends
/// tend to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Non-negative distance from the query embedding (smaller = closer).
    pub distance: f32,
}

/// One cited source in an [`Answer`], in retrieval order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Id of the retrieved chunk.
    pub id: String,
    /// Provenance label of the chunk, if recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Distance of the chunk from the query embedding.
    pub distance: f32,
    /// The raw chunk text handed to the model as context.
    pub text: String,
}

impl From<&QueryResult> for SourceRef {
    fn from(result: &QueryResult) -> Self {
        Self {
            id: result.chunk.id.clone(),
            source: result.chunk.metadata.source.clone(),
            distance: result.distance,
            text: result.chunk.text.clone(),
        }
    }
}

/// A grounded answer with the sources that informed it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated answer text.
    pub answer: String,
    /// Retrieved chunks backing the answer, nearest first.
    pub sources: Vec<SourceRef>,
}

/// Liveness signal returned by the `health` boundary operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Always `"ok"` while the process is able to respond.
    pub status: String,
}

impl Health {
    /// A healthy signal.
    pub fn ok() -> Self {
        Self { status: "ok".to_string() }
    }
}
