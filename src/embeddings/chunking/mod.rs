
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the character-window splitter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Number of characters shared between adjacent chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            overlap: 50,
        }
    }
}

/// Split text into overlapping character windows.
///
/// Each chunk holds at most `chunk_size` characters and shares exactly
/// `overlap` trailing/leading characters with its neighbor, so content that
/// straddles a window boundary is present in both windows. The final chunk
/// may be shorter. Boundaries are computed on `char` positions, never raw
/// bytes, so multi-byte text is never split mid-character.
///
/// Deterministic: identical input and configuration produce identical output.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chunk_size = config.chunk_size.max(1);
    // Config validation enforces overlap < chunk_size; clamp here so a
    // hand-constructed config cannot stall the loop.
    let overlap = config.overlap.min(chunk_size - 1);

    // Byte offset of every char boundary, plus the end of the string.
    let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    boundaries.push(text.len());
    let total_chars = boundaries.len() - 1;

    let mut chunks = Vec::with_capacity(total_chars.div_ceil(chunk_size - overlap));
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(total_chars);
        if let Some(chunk) = text.get(boundaries[start]..boundaries[end]) {
            chunks.push(chunk.to_string());
        }
        if end == total_chars {
            break;
        }
        start = end - overlap;
    }

    debug!(
        "Split {} chars into {} chunks (size {}, overlap {})",
        total_chars,
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}
