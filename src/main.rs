use clap::{Parser, Subcommand};
use std::path::PathBuf;
use voxrag::Result;
use voxrag::commands::{ingest_document, query_context, show_status};
use voxrag::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "voxrag")]
#[command(about = "Document ingestion and context retrieval for voice assistant agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding backend and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ingest a document (PDF or plain text) into the knowledge base
    Ingest {
        /// Path of the document to ingest
        file: PathBuf,
    },
    /// Retrieve context for a query string
    Query {
        /// Query text
        text: String,
        /// Number of chunks to retrieve (defaults to the configured top-k)
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show configuration and index status
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { file } => {
            ingest_document(&file)?;
        }
        Commands::Query { text, top_k } => {
            query_context(&text, top_k)?;
        }
        Commands::Status => {
            show_status()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["voxrag", "status"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            matches!(parsed.command, Commands::Status);
        }
    }

    #[test]
    fn ingest_command_with_file() {
        let cli = Cli::try_parse_from(["voxrag", "ingest", "manual.pdf"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Ingest { file } = parsed.command {
                assert_eq!(file, PathBuf::from("manual.pdf"));
            }
        }
    }

    #[test]
    fn query_command_with_top_k() {
        let cli = Cli::try_parse_from(["voxrag", "query", "opening hours", "--top-k", "3"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Query { text, top_k } = parsed.command {
                assert_eq!(text, "opening hours");
                assert_eq!(top_k, Some(3));
            }
        }
    }

    #[test]
    fn query_command_default_top_k() {
        let cli = Cli::try_parse_from(["voxrag", "query", "opening hours"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Query { top_k, .. } = parsed.command {
                assert_eq!(top_k, None);
            }
        }
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["voxrag", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["voxrag", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["voxrag", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
