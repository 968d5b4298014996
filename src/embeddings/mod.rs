// Embeddings module
// Chunking plus the text-to-vector backend shared by ingest and query paths

pub mod chunking;
pub mod ollama;

use crate::Result;

/// Text-to-vector backend.
///
/// Implementations must be deterministic for a fixed model: the same text
/// maps to the same vector on every call. Both the ingest and query paths
/// go through the same `Embedder`, so the two sides always agree on the
/// vector space.
pub trait Embedder: Send + Sync {
    /// Embed a single text into a fixed-dimension vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving input order.
    #[inline]
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}
