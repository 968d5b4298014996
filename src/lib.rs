use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Failed to build vector index: {0}")]
    IndexBuild(String),

    #[error("Index snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod document;
pub mod embeddings;
pub mod engine;
pub mod index;
