#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};

use super::{Config, OllamaConfig};
use crate::embeddings::ollama::OllamaClient;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 voxrag Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Embedding Backend").bold().yellow());
    eprintln!("Configure the local Ollama instance used for embedding generation.");
    eprintln!();

    configure_ollama(&mut config.ollama)?;

    eprintln!();
    eprintln!("{}", style("Retrieval").bold().yellow());
    configure_retrieval(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    if test_ollama_connection(&config.ollama) {
        eprintln!("{}", style("✓ Ollama connection successful!").green());
    } else {
        eprintln!(
            "{}",
            style("⚠ Warning: Could not connect to Ollama").yellow()
        );
        eprintln!("You can continue, but make sure Ollama is running before ingesting.");
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Ollama Settings:").bold().yellow());
    eprintln!("  Host: {}", style(&config.ollama.host).cyan());
    eprintln!("  Port: {}", style(config.ollama.port).cyan());
    eprintln!("  Model: {}", style(&config.ollama.model).cyan());
    eprintln!("  Batch Size: {}", style(config.ollama.batch_size).cyan());
    eprintln!(
        "  Request Timeout: {}s",
        style(config.ollama.timeout_secs).cyan()
    );
    match config.ollama.url() {
        Ok(url) => eprintln!("  Ollama URL: {}", style(url).cyan()),
        Err(e) => eprintln!("  Ollama URL: {} ({})", style("Invalid").red(), e),
    }

    eprintln!();
    eprintln!("{}", style("Chunking:").bold().yellow());
    eprintln!(
        "  Chunk Size: {} chars",
        style(config.chunking.chunk_size).cyan()
    );
    eprintln!("  Overlap: {} chars", style(config.chunking.overlap).cyan());

    eprintln!();
    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!("  Top-k: {}", style(config.retrieval.top_k).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
    eprintln!(
        "Index snapshot: {}",
        style(config.index_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config {
                base_dir: Config::config_dir()?,
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_ollama(ollama: &mut OllamaConfig) -> Result<()> {
    let protocols = &["http", "https"];
    let default_index = protocols
        .iter()
        .position(|&p| p == ollama.protocol)
        .unwrap_or(0);

    let protocol_index = Select::new()
        .with_prompt("Ollama protocol")
        .default(default_index)
        .items(protocols)
        .interact()?;
    ollama.protocol = protocols[protocol_index].to_string();

    ollama.host = Input::new()
        .with_prompt("Ollama host")
        .default(ollama.host.clone())
        .interact_text()?;

    ollama.port = Input::new()
        .with_prompt("Ollama port")
        .default(ollama.port)
        .interact_text()?;

    ollama.model = Input::new()
        .with_prompt("Embedding model")
        .default(ollama.model.clone())
        .interact_text()?;

    ollama.batch_size = Input::new()
        .with_prompt("Embedding batch size")
        .default(ollama.batch_size)
        .interact_text()?;

    Ok(())
}

fn configure_retrieval(config: &mut Config) -> Result<()> {
    config.chunking.chunk_size = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(config.chunking.chunk_size)
        .interact_text()?;

    config.chunking.overlap = Input::new()
        .with_prompt("Chunk overlap (characters)")
        .default(config.chunking.overlap)
        .interact_text()?;

    config.retrieval.top_k = Input::new()
        .with_prompt("Chunks returned per query (top-k)")
        .default(config.retrieval.top_k)
        .interact_text()?;

    Ok(())
}

fn test_ollama_connection(ollama: &OllamaConfig) -> bool {
    OllamaClient::new(ollama).is_ok_and(|client| client.ping().is_ok())
}
