// RAG engine module
// Composes document loading, chunking, embedding, and the vector index
// into the ingest (write) and query (read) paths

#[cfg(test)]
mod tests;

use itertools::Itertools;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::document::load_document;
use crate::embeddings::Embedder;
use crate::embeddings::chunking::{ChunkingConfig, split_text};
use crate::index::VectorIndex;
use crate::{RagError, Result};

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// File name of the ingested document
    pub document: String,
    pub chunks_indexed: usize,
}

impl fmt::Display for IngestReport {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Database updated with {} chunks.", self.chunks_indexed)
    }
}

/// Summary of the currently held index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub chunks: usize,
    pub dimension: usize,
    /// Document the index was built from
    pub source: String,
}

struct ActiveIndex {
    index: VectorIndex,
    source: String,
}

/// Retrieval-augmented-generation engine.
///
/// The engine owns at most one [`VectorIndex`] at a time. Ingestion always
/// builds a fresh index and replaces the previous one wholesale; there is
/// no incremental merge. Before the first successful ingestion, queries
/// return an empty context rather than an error.
///
/// All operations are synchronous and safe to call from multiple threads:
/// ingestions are serialized by a lock, the index reference is swapped
/// atomically only after a build fully succeeds, and a query issued after
/// an ingest returns always observes the new index.
pub struct RagEngine {
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    top_k: usize,
    active: RwLock<Option<Arc<ActiveIndex>>>,
    ingest_lock: Mutex<()>,
}

impl RagEngine {
    #[inline]
    pub fn new(embedder: Arc<dyn Embedder>, config: &Config) -> Self {
        Self {
            embedder,
            chunking: config.chunking.clone(),
            top_k: config.retrieval.top_k,
            active: RwLock::new(None),
            ingest_lock: Mutex::new(()),
        }
    }

    /// Ingest a document from disk, replacing any previously built index.
    ///
    /// On any failure (unreadable file, unsupported format, embedding
    /// backend down, index build error) the previous index is left exactly
    /// as it was.
    #[inline]
    pub fn ingest(&self, path: &Path) -> Result<IngestReport> {
        let document = load_document(path)?;
        self.ingest_text(&document.name, &document.text)
    }

    /// Ingest raw text under a document name, bypassing the file loaders.
    #[inline]
    pub fn ingest_text(&self, name: &str, text: &str) -> Result<IngestReport> {
        let _serialize = self.ingest_lock.lock();

        let chunks = split_text(text, &self.chunking);
        debug!("Document {} produced {} chunks", name, chunks.len());

        let embeddings = self.embedder.embed_batch(&chunks)?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::IndexBuild(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let pairs = embeddings.into_iter().zip(chunks).collect();
        let index = VectorIndex::build(pairs)?;
        let chunks_indexed = index.len();

        // Swap only after the build fully succeeded; every failure path
        // above leaves the previous index in place.
        *self.active.write() = Some(Arc::new(ActiveIndex {
            index,
            source: name.to_string(),
        }));

        info!("Index replaced: {} chunks from {}", chunks_indexed, name);

        Ok(IngestReport {
            document: name.to_string(),
            chunks_indexed,
        })
    }

    /// Retrieve context for a query using the configured top-k.
    #[inline]
    pub fn query(&self, text: &str) -> Result<String> {
        self.query_top_k(text, self.top_k)
    }

    /// Retrieve the concatenated text of the `k` chunks nearest to the
    /// query, joined by newlines in rank order.
    ///
    /// Returns an empty string when no document has been ingested yet, when
    /// the query is blank, or when the index holds no chunks. "No results"
    /// is never an error.
    #[inline]
    pub fn query_top_k(&self, text: &str, k: usize) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let active = self.active.read().clone();
        let Some(active) = active else {
            debug!("Query before first ingest; returning empty context");
            return Ok(String::new());
        };

        let query_embedding = self.embedder.embed(text)?;
        let hits = active.index.search(&query_embedding, k)?;

        debug!("Query matched {} chunks", hits.len());
        Ok(hits.iter().map(|hit| hit.text.as_str()).join("\n"))
    }

    /// Whether a document has been ingested (or a snapshot loaded).
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.active.read().is_some()
    }

    #[inline]
    pub fn stats(&self) -> Option<IndexStats> {
        self.active.read().as_ref().map(|active| IndexStats {
            chunks: active.index.len(),
            dimension: active.index.dimension(),
            source: active.source.clone(),
        })
    }

    /// Persist the current index as a snapshot at `path`.
    #[inline]
    pub fn save_index(&self, path: &Path) -> Result<()> {
        let active = self.active.read().clone();
        let Some(active) = active else {
            return Err(RagError::Snapshot(
                "no index has been built yet".to_string(),
            ));
        };
        active.index.save(path, &active.source)
    }

    /// Restore an index from a snapshot written by [`RagEngine::save_index`].
    ///
    /// Replaces the current index like an ingest does, without touching the
    /// embedding backend. The snapshot must have been produced with the
    /// same embedding model for query results to be meaningful.
    #[inline]
    pub fn load_index(&self, path: &Path) -> Result<IndexStats> {
        let snapshot = VectorIndex::load(path)?;

        let _serialize = self.ingest_lock.lock();
        let stats = IndexStats {
            chunks: snapshot.index.len(),
            dimension: snapshot.index.dimension(),
            source: snapshot.source.clone(),
        };
        *self.active.write() = Some(Arc::new(ActiveIndex {
            index: snapshot.index,
            source: snapshot.source,
        }));

        Ok(stats)
    }
}
