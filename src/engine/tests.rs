use super::*;
use tempfile::TempDir;

const DIM: usize = 32;

/// Deterministic bag-of-words embedder: hashes each word into a bucket of
/// a fixed-size histogram. Shared vocabulary between two texts moves their
/// vectors closer, which is enough signal for ranking tests.
struct HashEmbedder;

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> crate::Result<Vec<f32>> {
        let mut vector = vec![0.0f32; DIM];
        for word in text.split_whitespace() {
            let word: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            let mut hash: u32 = 2_166_136_261;
            for byte in word.bytes() {
                hash ^= u32::from(byte);
                hash = hash.wrapping_mul(16_777_619);
            }
            vector[hash as usize % DIM] += 1.0;
        }
        Ok(vector)
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> crate::Result<Vec<f32>> {
        Err(RagError::ModelUnavailable("model is offline".to_string()))
    }
}

fn test_engine() -> RagEngine {
    RagEngine::new(Arc::new(HashEmbedder), &Config::default())
}

fn engine_with(chunk_size: usize, overlap: usize, top_k: usize) -> RagEngine {
    let mut config = Config::default();
    config.chunking = ChunkingConfig {
        chunk_size,
        overlap,
    };
    config.retrieval.top_k = top_k;
    RagEngine::new(Arc::new(HashEmbedder), &config)
}

#[test]
fn query_before_ingest_returns_empty() {
    let engine = test_engine();
    assert!(!engine.is_ready());

    let context = engine.query("anything").expect("query should not fail");
    assert_eq!(context, "");
}

#[test]
fn blank_query_returns_empty() {
    let engine = test_engine();
    engine
        .ingest_text("notes.txt", "Office hours are nine to five.")
        .expect("can ingest");

    let context = engine.query("   ").expect("query should not fail");
    assert_eq!(context, "");
}

#[test]
fn round_trip_retrieval() {
    let engine = test_engine();

    let report = engine
        .ingest_text(
            "report.txt",
            "The quarterly revenue was $4.2 million. Support tickets are \
             answered within two business days.",
        )
        .expect("can ingest");
    assert_eq!(report.chunks_indexed, 1);
    assert!(engine.is_ready());

    let context = engine
        .query("What was the revenue?")
        .expect("query should succeed");
    assert!(context.contains("The quarterly revenue was $4.2 million."));
}

#[test]
fn ranking_prefers_vocabulary_overlap() {
    let engine = engine_with(80, 10, 1);

    let text = "The quarterly revenue was four point two million dollars \
                overall this period. Meanwhile the aquarium turtles swim \
                slowly past the coral reef display every single morning.";
    engine.ingest_text("mixed.txt", text).expect("can ingest");

    let context = engine
        .query("What was the quarterly revenue?")
        .expect("query should succeed");
    assert!(context.contains("revenue"));
    assert!(!context.contains("turtles"));
}

#[test]
fn replacement_semantics() {
    let engine = test_engine();

    engine
        .ingest_text(
            "solar.txt",
            "Solar panels must be inspected twice a year for debris.",
        )
        .expect("can ingest first document");

    engine
        .ingest_text(
            "espresso.txt",
            "The espresso machine requires descaling every month.",
        )
        .expect("can ingest second document");

    let stats = engine.stats().expect("engine should be ready");
    assert_eq!(stats.source, "espresso.txt");

    // Only content from the second document can ever be retrieved.
    let context = engine
        .query("How often are solar panels inspected?")
        .expect("query should succeed");
    assert!(!context.contains("Solar"));
    assert!(context.contains("espresso machine"));
}

#[test]
fn k_respected() {
    let engine = engine_with(60, 10, 2);

    // No newlines in the source text, so newlines in the context delimit
    // retrieved chunks.
    let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa \
                lambda mu nu xi omicron pi rho sigma tau upsilon phi chi \
                psi omega one two three four five six seven eight nine ten";
    let report = engine.ingest_text("words.txt", text).expect("can ingest");
    assert!(report.chunks_indexed > 2);

    let context = engine
        .query_top_k("alpha omega", 2)
        .expect("query should succeed");
    assert!(!context.is_empty());
    assert!(context.lines().count() <= 2);
}

#[test]
fn empty_document_builds_empty_index() {
    let engine = test_engine();

    let report = engine.ingest_text("empty.txt", "").expect("can ingest");
    assert_eq!(report.chunks_indexed, 0);
    assert_eq!(report.to_string(), "Database updated with 0 chunks.");
    assert!(engine.is_ready());

    let context = engine.query("anything").expect("query should succeed");
    assert_eq!(context, "");
}

#[test]
fn ingest_report_display() {
    let engine = test_engine();
    let report = engine
        .ingest_text("notes.txt", "Deliveries arrive on Tuesdays.")
        .expect("can ingest");

    assert_eq!(report.to_string(), "Database updated with 1 chunks.");
    assert_eq!(report.document, "notes.txt");
}

#[test]
fn failed_ingest_preserves_previous_index() {
    let engine = test_engine();

    engine
        .ingest_text("good.txt", "The warranty covers parts for two years.")
        .expect("can ingest");

    let result = engine.ingest(Path::new("/nonexistent/missing.txt"));
    assert!(matches!(result, Err(RagError::DocumentLoad(_))));

    let result = engine.ingest(Path::new("/nonexistent/deck.pptx"));
    assert!(matches!(result, Err(RagError::UnsupportedFormat(_))));

    // The engine still answers from the last successful ingestion.
    let context = engine
        .query("What does the warranty cover?")
        .expect("query should succeed");
    assert!(context.contains("warranty"));

    let stats = engine.stats().expect("engine should be ready");
    assert_eq!(stats.source, "good.txt");
}

#[test]
fn embedder_failure_leaves_engine_empty() {
    let engine = RagEngine::new(Arc::new(FailingEmbedder), &Config::default());

    let result = engine.ingest_text("notes.txt", "Some content.");
    assert!(matches!(result, Err(RagError::ModelUnavailable(_))));
    assert!(!engine.is_ready());

    // Still in the empty state, so queries short-circuit to empty context
    // without touching the embedder.
    let context = engine.query("anything").expect("query should not fail");
    assert_eq!(context, "");
}

#[test]
fn stats_reflect_current_index() {
    let engine = test_engine();
    assert!(engine.stats().is_none());

    let report = engine
        .ingest_text("manual.txt", "Close the valve before servicing the pump.")
        .expect("can ingest");

    let stats = engine.stats().expect("engine should be ready");
    assert_eq!(stats.chunks, report.chunks_indexed);
    assert_eq!(stats.dimension, DIM);
    assert_eq!(stats.source, "manual.txt");
}

#[test]
fn snapshot_save_and_load() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let path = temp_dir.path().join("index.json");

    let engine = test_engine();
    engine
        .ingest_text("faq.txt", "Returns are accepted within thirty days.")
        .expect("can ingest");
    engine.save_index(&path).expect("can save index");

    // A fresh engine restored from the snapshot answers the same queries.
    let restored = test_engine();
    assert!(!restored.is_ready());

    let stats = restored.load_index(&path).expect("can load index");
    assert_eq!(stats.source, "faq.txt");
    assert!(restored.is_ready());

    let context = restored
        .query("When are returns accepted?")
        .expect("query should succeed");
    assert!(context.contains("thirty days"));
}

#[test]
fn save_without_index_fails() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let engine = test_engine();

    let result = engine.save_index(&temp_dir.path().join("index.json"));
    assert!(matches!(result, Err(RagError::Snapshot(_))));
}
