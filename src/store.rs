//! Vector store adapter: aligned upsert, nearest-neighbor query, and a
//! snapshot-backed in-memory implementation.
//!
//! The [`VectorStore`] trait is the adapter boundary over an external
//! nearest-neighbor capability. Upserts take the four parallel sequences the
//! store layer works in (ids, documents, metadatas, embeddings) and must be
//! validated with [`align_batch`] before anything reaches the backend, so a
//! misaligned batch can never store a partial record.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::document::{Chunk, ChunkMetadata, QueryResult};
use crate::error::{RagError, Result};

/// A storage backend for embedded chunks with nearest-neighbor search.
///
/// Inserts are additive: the core defines no delete or update operation.
/// If the backend treats a repeated id as an overwrite, that behavior is
/// inherited. Individual calls are safe under concurrent access, but there
/// is no cross-call atomicity: a query racing a concurrent upsert may or
/// may not observe the new chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert a batch of chunks given as four positionally aligned sequences.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Alignment`] if the sequences differ in length or
    /// are empty, and stores nothing in that case. Backend failures surface
    /// as [`RagError::Store`].
    async fn upsert(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[ChunkMetadata],
        embeddings: &[Vec<f32>],
    ) -> Result<()>;

    /// Return the `k` stored chunks nearest to `embedding`, ordered by
    /// ascending distance.
    ///
    /// Returns fewer than `k` results if the store holds fewer chunks, and
    /// an empty `Vec` if it is empty.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryResult>>;

    /// Flush the store to durable storage, where the backend supports it.
    ///
    /// Durability is best-effort: callers treat a failed persist as a
    /// warning, never as an ingestion failure.
    async fn persist(&self) -> Result<()>;
}

/// Validate positional alignment of an upsert batch and zip it into typed
/// [`Chunk`] records.
///
/// # Errors
///
/// Returns [`RagError::Alignment`] if the four sequences differ in length
/// or are empty.
pub fn align_batch(
    ids: &[String],
    documents: &[String],
    metadatas: &[ChunkMetadata],
    embeddings: &[Vec<f32>],
) -> Result<Vec<Chunk>> {
    let aligned = ids.len() == documents.len()
        && ids.len() == metadatas.len()
        && ids.len() == embeddings.len();

    if !aligned || ids.is_empty() {
        return Err(RagError::Alignment {
            ids: ids.len(),
            documents: documents.len(),
            metadatas: metadatas.len(),
            embeddings: embeddings.len(),
        });
    }

    Ok(ids
        .iter()
        .zip(documents)
        .zip(metadatas)
        .zip(embeddings)
        .map(|(((id, text), metadata), embedding)| Chunk {
            id: id.clone(),
            text: text.clone(),
            metadata: metadata.clone(),
            embedding: embedding.clone(),
        })
        .collect())
}

/// Compute cosine distance (`1 − cosine similarity`) between two vectors.
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// An in-memory vector store using cosine distance, with optional JSON
/// snapshot persistence.
///
/// Chunks live in a `HashMap` behind a `tokio::sync::RwLock`, keyed by id,
/// so a repeated id overwrites the previous record. When opened with a
/// snapshot path, [`persist`](VectorStore::persist) serializes the full
/// contents to that path; [`open`](MemoryVectorStore::open) reloads an
/// existing snapshot or starts empty, so the collection is obtained or
/// created exactly once at process start.
///
/// # Example
///
/// ```rust,ignore
/// use ragkit::{MemoryVectorStore, VectorStore};
///
/// let store = MemoryVectorStore::open("./rag_snapshot.json").await;
/// let results = store.query(&query_embedding, 5).await?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryVectorStore {
    chunks: RwLock<HashMap<String, Chunk>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryVectorStore {
    /// Create a new empty store with no snapshot persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by a JSON snapshot at `path`.
    ///
    /// Reuses the snapshot if it exists and parses; otherwise starts empty.
    /// An unreadable or corrupt snapshot is logged and discarded rather than
    /// failing startup, mirroring get-or-create collection semantics.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let chunks = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<Chunk>>(&bytes) {
                Ok(loaded) => {
                    info!(path = %path.display(), chunks = loaded.len(), "loaded store snapshot");
                    loaded.into_iter().map(|c| (c.id.clone(), c)).collect()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "snapshot unreadable; starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no snapshot found; starting empty");
                HashMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "snapshot unreadable; starting empty");
                HashMap::new()
            }
        };

        Self { chunks: RwLock::new(chunks), snapshot_path: Some(path) }
    }

    /// Number of chunks currently stored.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    /// Whether the store holds no chunks.
    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    /// All stored chunks, in no particular order.
    pub async fn dump(&self) -> Vec<Chunk> {
        self.chunks.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(
        &self,
        ids: &[String],
        documents: &[String],
        metadatas: &[ChunkMetadata],
        embeddings: &[Vec<f32>],
    ) -> Result<()> {
        let batch = align_batch(ids, documents, metadatas, embeddings)?;

        let mut chunks = self.chunks.write().await;
        for chunk in batch {
            chunks.insert(chunk.id.clone(), chunk);
        }
        debug!(inserted = ids.len(), total = chunks.len(), "upserted batch");
        Ok(())
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<QueryResult>> {
        let chunks = self.chunks.read().await;

        let mut scored: Vec<QueryResult> = chunks
            .values()
            .map(|chunk| {
                let distance = cosine_distance(&chunk.embedding, embedding);
                QueryResult { chunk: chunk.clone(), distance }
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    async fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let chunks = self.chunks.read().await;
        let snapshot: Vec<&Chunk> = chunks.values().collect();
        let bytes = serde_json::to_vec(&snapshot).map_err(|e| RagError::Store {
            backend: "memory".to_string(),
            message: format!("failed to serialize snapshot: {e}"),
        })?;
        drop(chunks);

        tokio::fs::write(path, bytes).await.map_err(|e| RagError::Store {
            backend: "memory".to_string(),
            message: format!("failed to write snapshot to '{}': {e}", path.display()),
        })?;

        debug!(path = %path.display(), "persisted store snapshot");
        Ok(())
    }
}
