use anyhow::{Context, Result};
use console::style;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::embeddings::ollama::OllamaClient;
use crate::engine::RagEngine;
use crate::index::VectorIndex;

/// Ingest a document into the knowledge base and persist the snapshot
#[inline]
pub fn ingest_document(path: &Path) -> Result<()> {
    let config = Config::load()?;

    let client = OllamaClient::new(&config.ollama).context("Failed to initialize Ollama client")?;
    client
        .health_check()
        .context("Embedding backend is not usable")?;

    let engine = RagEngine::new(Arc::new(client), &config);

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Indexing {}", path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = engine.ingest(path);
    spinner.finish_and_clear();
    let report = result?;

    engine
        .save_index(&config.index_path())
        .context("Failed to persist index snapshot")?;

    println!("{report}");
    Ok(())
}

/// Retrieve context for a query against the persisted index
#[inline]
pub fn query_context(text: &str, top_k: Option<usize>) -> Result<()> {
    let config = Config::load()?;

    let client = OllamaClient::new(&config.ollama).context("Failed to initialize Ollama client")?;
    let engine = RagEngine::new(Arc::new(client), &config);

    let snapshot_path = config.index_path();
    if snapshot_path.exists() {
        engine
            .load_index(&snapshot_path)
            .context("Failed to load index snapshot")?;
    }

    let context = match top_k {
        Some(k) => engine.query_top_k(text, k)?,
        None => engine.query(text)?,
    };

    if context.is_empty() {
        if engine.is_ready() {
            eprintln!("{}", style("No matching context found.").yellow());
        } else {
            eprintln!(
                "{}",
                style("No document has been ingested yet. Run 'voxrag ingest <file>' first.")
                    .yellow()
            );
        }
    } else {
        println!("{context}");
    }

    Ok(())
}

/// Show configuration and index status
#[inline]
pub fn show_status() -> Result<()> {
    let config = Config::load()?;

    println!("{}", style("voxrag status").bold().cyan());
    println!();

    println!("{}", style("Embedding backend:").bold().yellow());
    println!("  Model: {}", style(&config.ollama.model).cyan());
    match config.ollama.url() {
        Ok(url) => println!("  URL: {}", style(url).cyan()),
        Err(e) => println!("  URL: {} ({})", style("Invalid").red(), e),
    }

    let reachable =
        OllamaClient::new(&config.ollama).is_ok_and(|client| client.ping().is_ok());
    if reachable {
        println!("  Server: {}", style("reachable").green());
    } else {
        println!("  Server: {}", style("unreachable").red());
    }

    println!();
    println!("{}", style("Retrieval:").bold().yellow());
    println!(
        "  Chunking: {} chars, {} overlap",
        style(config.chunking.chunk_size).cyan(),
        style(config.chunking.overlap).cyan()
    );
    println!("  Top-k: {}", style(config.retrieval.top_k).cyan());

    println!();
    println!("{}", style("Index snapshot:").bold().yellow());
    let snapshot_path = config.index_path();
    if snapshot_path.exists() {
        match VectorIndex::load(&snapshot_path) {
            Ok(snapshot) => {
                println!("  Source: {}", style(&snapshot.source).cyan());
                println!("  Chunks: {}", style(snapshot.index.len()).cyan());
                println!("  Dimensions: {}", style(snapshot.index.dimension()).cyan());
                println!("  Created: {}", style(&snapshot.created_at).cyan());
            }
            Err(e) => {
                println!("  {} ({})", style("Unreadable").red(), e);
            }
        }
        println!("  Path: {}", style(snapshot_path.display()).dim());
    } else {
        println!("  {}", style("None (no document ingested yet)").yellow());
    }

    Ok(())
}
