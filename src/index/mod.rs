// Vector index module
// In-memory similarity search over chunk embeddings, with JSON snapshots


use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{RagError, Result};

/// An indexed chunk: its normalized embedding plus the original text payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique identifier for this entry
    pub id: String,
    /// Position of the chunk within its source document
    pub chunk_index: u32,
    /// The chunk text returned as retrieval payload
    pub text: String,
    /// L2-normalized embedding vector
    pub vector: Vec<f32>,
}

/// A ranked result from a similarity search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub text: String,
    pub score: f32,
    pub chunk_index: u32,
}

/// On-disk form of a built index.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// RFC 3339 timestamp of when the snapshot was written
    pub created_at: String,
    /// Name of the document the index was built from
    pub source: String,
    pub index: VectorIndex,
}

/// In-memory similarity index over chunk embeddings.
///
/// Vectors are L2-normalized at build time and compared by dot product,
/// i.e. cosine similarity. Ranking by descending cosine over normalized
/// vectors is equivalent to ranking by ascending L2 distance, the metric
/// the reference sentence-embedding models are tuned for; the same
/// normalization is applied to queries so build and search always agree.
///
/// An index is immutable once built. Callers replace it wholesale rather
/// than merging into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build a fresh index from `(embedding, chunk_text)` pairs.
    ///
    /// All vectors must share one nonzero dimension. An empty input builds
    /// an empty index, which is valid and returns no hits.
    #[inline]
    pub fn build(pairs: Vec<(Vec<f32>, String)>) -> Result<Self> {
        let Some(first) = pairs.first() else {
            return Ok(Self {
                dimension: 0,
                entries: Vec::new(),
            });
        };

        let dimension = first.0.len();
        if dimension == 0 {
            return Err(RagError::IndexBuild(
                "embedding dimension is zero".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(pairs.len());
        for (chunk_index, (vector, text)) in pairs.into_iter().enumerate() {
            if vector.len() != dimension {
                return Err(RagError::IndexBuild(format!(
                    "chunk {} has dimension {} but the index has dimension {}",
                    chunk_index,
                    vector.len(),
                    dimension
                )));
            }

            entries.push(IndexEntry {
                id: Uuid::new_v4().to_string(),
                chunk_index: chunk_index as u32,
                text,
                vector: normalize(vector),
            });
        }

        info!(
            "Built vector index with {} entries ({} dimensions)",
            entries.len(),
            dimension
        );

        Ok(Self { dimension, entries })
    }

    /// Return up to `k` entries ranked by descending cosine similarity to
    /// the query vector. Ties keep insertion order (the sort is stable).
    #[inline]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        if query.len() != self.dimension {
            return Err(RagError::IndexBuild(format!(
                "query has dimension {} but the index has dimension {}",
                query.len(),
                self.dimension
            )));
        }

        let query = normalize(query.to_vec());

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                text: entry.text.clone(),
                score: dot(&entry.vector, &query),
                chunk_index: entry.chunk_index,
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(k);

        debug!("Search returned {} hits (k = {})", hits.len(), k);
        Ok(hits)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension, or zero for an empty index.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Write the index to a JSON snapshot at `path`.
    #[inline]
    pub fn save(&self, path: &Path, source: &str) -> Result<()> {
        let snapshot = IndexSnapshot {
            created_at: Utc::now().to_rfc3339(),
            source: source.to_string(),
            index: self.clone(),
        };

        let json = serde_json::to_string(&snapshot)
            .map_err(|e| RagError::Snapshot(format!("failed to serialize index: {e}")))?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, json)?;

        info!(
            "Saved index snapshot ({} entries) to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }

    /// Read a snapshot previously written by [`VectorIndex::save`].
    #[inline]
    pub fn load(path: &Path) -> Result<IndexSnapshot> {
        let json = fs::read_to_string(path)?;
        let snapshot: IndexSnapshot = serde_json::from_str(&json)
            .map_err(|e| RagError::Snapshot(format!("failed to parse index snapshot: {e}")))?;

        info!(
            "Loaded index snapshot ({} entries, source: {})",
            snapshot.index.len(),
            snapshot.source
        );
        Ok(snapshot)
    }
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector
        .iter()
        .fold(0.0f32, |acc, v| v.mul_add(*v, acc))
        .sqrt();
    if norm > f32::EPSILON {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .fold(0.0f32, |acc, (x, y)| x.mul_add(*y, acc))
}
