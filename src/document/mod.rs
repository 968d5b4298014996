// Document module
// Resolves an uploaded file into raw text before chunking


use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::{RagError, Result};

/// Closed set of source formats the ingest path accepts.
///
/// The format is resolved once at this boundary; downstream stages
/// (chunker, embedder, index) only ever see plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

/// A document read into memory, ready for chunking.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// File name of the source, used for reporting and snapshot metadata
    pub name: String,
    pub kind: DocumentKind,
    pub text: String,
}

impl DocumentKind {
    /// Infer the document kind from a file extension.
    ///
    /// Extensions outside the recognized set are rejected up front so the
    /// text loader never silently ingests binary formats it cannot parse.
    #[inline]
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("txt" | "text" | "md" | "markdown" | "log") | None => Ok(Self::PlainText),
            Some(other) => Err(RagError::UnsupportedFormat(format!(
                "unrecognized file extension '.{other}' for {}",
                path.display()
            ))),
        }
    }
}

/// Read a document's raw text, dispatching on its [`DocumentKind`].
#[inline]
pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    let kind = DocumentKind::from_path(path)?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    debug!("Loading document {} as {:?}", path.display(), kind);

    let text = match kind {
        DocumentKind::Pdf => pdf_extract::extract_text(path).map_err(|e| {
            RagError::DocumentLoad(format!("failed to extract text from {}: {e}", path.display()))
        })?,
        DocumentKind::PlainText => fs::read_to_string(path).map_err(|e| {
            RagError::DocumentLoad(format!("failed to read {}: {e}", path.display()))
        })?,
    };

    info!(
        "Loaded document {} ({} chars, {:?})",
        name,
        text.chars().count(),
        kind
    );

    Ok(LoadedDocument { name, kind, text })
}
