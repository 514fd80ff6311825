//! Integration tests for the ingest pipeline and query engine, using
//! injected test doubles for the external capabilities.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ragkit::{
    AnswerGenerator, EmbeddingProvider, IngestPipeline, MemoryVectorStore, QueryEngine, RagError,
    Result,
};

const DIM: usize = 4;

/// Deterministic embedder: hashes the text into a fixed-dimension vector.
/// Identical text always embeds identically.
struct HashEmbedder;

fn hash_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for (i, b) in text.bytes().enumerate() {
        v[i % DIM] += f32::from(b) / 255.0;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(hash_embedding(text))
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Embedder that fails for any text containing a poison marker.
struct PoisonEmbedder {
    marker: &'static str,
}

#[async_trait]
impl EmbeddingProvider for PoisonEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.contains(self.marker) {
            return Err(RagError::Embedding {
                provider: "poison".to_string(),
                message: format!("refusing to embed '{text}'"),
            });
        }
        Ok(hash_embedding(text))
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Embedder that always fails.
struct BrokenEmbedder;

#[async_trait]
impl EmbeddingProvider for BrokenEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::Embedding {
            provider: "broken".to_string(),
            message: "capability unavailable".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Generator that records the context it receives and echoes the query.
#[derive(Default)]
struct RecordingGenerator {
    contexts: Mutex<Vec<String>>,
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    async fn generate_answer(&self, context: &str, query: &str) -> Result<String> {
        self.contexts.lock().await.push(context.to_string());
        Ok(format!("answer to: {query}"))
    }
}

/// Generator that always fails.
struct BrokenGenerator;

#[async_trait]
impl AnswerGenerator for BrokenGenerator {
    async fn generate_answer(&self, _context: &str, _query: &str) -> Result<String> {
        Err(RagError::Generation {
            provider: "broken".to_string(),
            message: "model offline".to_string(),
        })
    }
}

fn ingest_pipeline(
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<MemoryVectorStore>,
) -> IngestPipeline {
    IngestPipeline::builder().embedding_provider(embedder).vector_store(store).build().unwrap()
}

fn query_engine(
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<MemoryVectorStore>,
    generator: Arc<dyn AnswerGenerator>,
) -> QueryEngine {
    QueryEngine::builder()
        .embedding_provider(embedder)
        .vector_store(store)
        .generator(generator)
        .build()
        .unwrap()
}

// ── Ingestion ──────────────────────────────────────────────────────

#[tokio::test]
async fn ingest_counts_one_chunk_per_sentence() {
    let store = Arc::new(MemoryVectorStore::new());
    let pipeline = ingest_pipeline(Arc::new(HashEmbedder), store.clone());

    let inserted = pipeline.ingest("notes.txt", b"Hello world. How are you? Fine.").await.unwrap();
    assert_eq!(inserted, 3);
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn ingest_attaches_filename_as_source() {
    let store = Arc::new(MemoryVectorStore::new());
    let pipeline = ingest_pipeline(Arc::new(HashEmbedder), store.clone());

    pipeline.ingest("notes.txt", b"One fact.").await.unwrap();
    let chunks = store.dump().await;
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].metadata.source.as_deref(), Some("notes.txt"));
    assert_eq!(chunks[0].text, "One fact.");
    assert!(!chunks[0].id.is_empty());
}

#[tokio::test]
async fn ingest_generates_fresh_ids_per_upload() {
    let store = Arc::new(MemoryVectorStore::new());
    let pipeline = ingest_pipeline(Arc::new(HashEmbedder), store.clone());

    pipeline.ingest("a.txt", b"Same sentence.").await.unwrap();
    pipeline.ingest("a.txt", b"Same sentence.").await.unwrap();

    // Re-ingesting the same content creates new chunks under new ids.
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn ingest_decodes_invalid_utf8_lossily() {
    let store = Arc::new(MemoryVectorStore::new());
    let pipeline = ingest_pipeline(Arc::new(HashEmbedder), store.clone());

    let mut bytes = b"Valid start. ".to_vec();
    bytes.extend_from_slice(&[0xFF, 0xFE]);
    bytes.extend_from_slice(b" valid end.");

    let inserted = pipeline.ingest("mixed.bin", &bytes).await.unwrap();
    assert_eq!(inserted, 2);
}

#[tokio::test]
async fn ingest_rejects_empty_document() {
    let store = Arc::new(MemoryVectorStore::new());
    let pipeline = ingest_pipeline(Arc::new(HashEmbedder), store.clone());

    let err = pipeline.ingest("empty.txt", b"   \n  ").await.unwrap_err();
    assert!(matches!(err, RagError::EmptyDocument));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn one_failed_embed_drops_only_that_chunk() {
    let store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(PoisonEmbedder { marker: "POISON" });
    let pipeline = ingest_pipeline(embedder, store.clone());

    let inserted =
        pipeline.ingest("doc.txt", b"Good one. POISON here. Good two.").await.unwrap();
    assert_eq!(inserted, 2);

    // No partial or misaligned record for the dropped chunk.
    let chunks = store.dump().await;
    assert_eq!(chunks.len(), 2);
    for chunk in &chunks {
        assert!(!chunk.text.contains("POISON"));
        assert_eq!(chunk.embedding.len(), DIM);
    }
}

#[tokio::test]
async fn all_failed_embeds_yield_no_embeddings_error_and_zero_upserts() {
    let store = Arc::new(MemoryVectorStore::new());
    let pipeline = ingest_pipeline(Arc::new(BrokenEmbedder), store.clone());

    let err = pipeline.ingest("doc.txt", b"One. Two. Three.").await.unwrap_err();
    assert!(matches!(err, RagError::NoEmbeddings { attempted: 3 }));
    assert!(store.is_empty().await);
}

// ── Query ──────────────────────────────────────────────────────────

#[tokio::test]
async fn blank_query_fails_before_any_embedding_call() {
    let store = Arc::new(MemoryVectorStore::new());
    // BrokenEmbedder would fail the request if embedding were attempted.
    let engine =
        query_engine(Arc::new(BrokenEmbedder), store, Arc::new(RecordingGenerator::default()));

    for query in ["", "   ", "\n\t"] {
        let err = engine.answer(query, Some(5)).await.unwrap_err();
        assert!(matches!(err, RagError::EmptyQuery));
    }
}

#[tokio::test]
async fn answer_on_empty_store_reaches_generation_with_empty_context() {
    let store = Arc::new(MemoryVectorStore::new());
    let generator = Arc::new(RecordingGenerator::default());
    let engine = query_engine(Arc::new(HashEmbedder), store, generator.clone());

    let answer = engine.answer("anything stored?", None).await.unwrap();
    assert!(answer.sources.is_empty());
    assert_eq!(answer.answer, "answer to: anything stored?");

    let contexts = generator.contexts.lock().await;
    assert_eq!(contexts.len(), 1);
    assert!(contexts[0].is_empty());
}

#[tokio::test]
async fn answer_returns_sources_in_retrieval_order() {
    let store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(HashEmbedder);
    let pipeline = ingest_pipeline(embedder.clone(), store.clone());
    pipeline
        .ingest("facts.txt", b"The sky is blue. Water is wet. Rust is fast.")
        .await
        .unwrap();

    let generator = Arc::new(RecordingGenerator::default());
    let engine = query_engine(embedder, store, generator.clone());

    let answer = engine.answer("The sky is blue.", Some(3)).await.unwrap();
    assert_eq!(answer.sources.len(), 3);

    // Nearest first: the verbatim sentence embeds identically to the query.
    assert_eq!(answer.sources[0].text, "The sky is blue.");
    assert!(answer.sources[0].distance.abs() < 1e-6);
    for window in answer.sources.windows(2) {
        assert!(window[0].distance <= window[1].distance);
    }

    // Context blocks mirror the source order and labeling.
    let contexts = generator.contexts.lock().await;
    assert!(contexts[0].starts_with("Source: facts.txt\nThe sky is blue.\n---\n"));
}

#[tokio::test]
async fn answer_respects_caller_supplied_k() {
    let store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(HashEmbedder);
    let pipeline = ingest_pipeline(embedder.clone(), store.clone());
    pipeline.ingest("facts.txt", b"One. Two. Three. Four.").await.unwrap();

    let engine = query_engine(embedder, store, Arc::new(RecordingGenerator::default()));
    let answer = engine.answer("One.", Some(2)).await.unwrap();
    assert_eq!(answer.sources.len(), 2);
}

#[tokio::test]
async fn retrieval_ordering_is_idempotent_across_answers() {
    let store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(HashEmbedder);
    let pipeline = ingest_pipeline(embedder.clone(), store.clone());
    pipeline.ingest("facts.txt", b"Alpha fact. Beta fact. Gamma fact.").await.unwrap();

    let engine = query_engine(embedder, store, Arc::new(RecordingGenerator::default()));
    let first = engine.answer("Alpha fact.", None).await.unwrap();
    let second = engine.answer("Alpha fact.", None).await.unwrap();

    let first_ids: Vec<&str> = first.sources.iter().map(|s| s.id.as_str()).collect();
    let second_ids: Vec<&str> = second.sources.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn embedding_failure_aborts_query() {
    let store = Arc::new(MemoryVectorStore::new());
    let engine =
        query_engine(Arc::new(BrokenEmbedder), store, Arc::new(RecordingGenerator::default()));

    let err = engine.answer("valid question", None).await.unwrap_err();
    assert!(matches!(err, RagError::Embedding { .. }));
}

#[tokio::test]
async fn generation_failure_aborts_query_without_partial_answer() {
    let store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(HashEmbedder);
    let pipeline = ingest_pipeline(embedder.clone(), store.clone());
    pipeline.ingest("facts.txt", b"A stored fact.").await.unwrap();

    let engine = query_engine(embedder, store, Arc::new(BrokenGenerator));
    let err = engine.answer("what now?", None).await.unwrap_err();
    assert!(matches!(err, RagError::Generation { .. }));
}

#[tokio::test]
async fn retrieve_returns_matches_without_generating() {
    let store = Arc::new(MemoryVectorStore::new());
    let embedder = Arc::new(HashEmbedder);
    let pipeline = ingest_pipeline(embedder.clone(), store.clone());
    pipeline.ingest("facts.txt", b"First. Second.").await.unwrap();

    let generator = Arc::new(RecordingGenerator::default());
    let engine = query_engine(embedder, store, generator.clone());

    let results = engine.retrieve("First.", Some(1)).await.unwrap();
    assert_eq!(results.len(), 1);
    assert!(generator.contexts.lock().await.is_empty());
}

#[tokio::test]
async fn health_reports_ok() {
    let store = Arc::new(MemoryVectorStore::new());
    let engine =
        query_engine(Arc::new(HashEmbedder), store, Arc::new(RecordingGenerator::default()));
    assert_eq!(engine.health().status, "ok");
}

// ── Builders ───────────────────────────────────────────────────────

#[tokio::test]
async fn builders_reject_missing_capabilities() {
    let err = IngestPipeline::builder().build().unwrap_err();
    assert!(matches!(err, RagError::Config(_)));

    let err = QueryEngine::builder().build().unwrap_err();
    assert!(matches!(err, RagError::Config(_)));

    let err = QueryEngine::builder()
        .embedding_provider(Arc::new(HashEmbedder))
        .vector_store(Arc::new(MemoryVectorStore::new()))
        .generator(Arc::new(RecordingGenerator::default()))
        .default_k(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, RagError::Config(_)));
}
