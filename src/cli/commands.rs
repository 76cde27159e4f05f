//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Ask questions about your PDF, text and markdown documents")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize database schema and indexes
    Init {
        /// Skip the ivfflat vector index even when enabled in config
        #[arg(long)]
        skip_indexes: bool,
    },
    /// Start the HTTP API server
    Serve {
        /// Host to bind (default: server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default: server.port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS for all origins
        #[arg(long)]
        cors: bool,
    },
    /// Ask a question; starts an interactive session when no question is given
    Ask {
        /// The question to ask
        question: Option<String>,
        /// Number of segments to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
        /// Only search within this document
        #[arg(short, long)]
        document: Option<Uuid>,
    },
    /// Upload and index a document
    Upload {
        /// Path to a .pdf, .txt or .md file
        path: PathBuf,
    },
    /// List uploaded documents
    List,
    /// Delete a document and its segments
    Delete {
        /// Document id
        id: Uuid,
    },
    /// Show current configuration (secrets masked)
    Config,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_options() {
        let id = Uuid::new_v4();
        let cli = Cli::parse_from([
            "docrag",
            "ask",
            "what is covered?",
            "-k",
            "3",
            "--document",
            &id.to_string(),
        ]);
        match cli.command {
            Commands::Ask {
                question,
                top_k,
                document,
            } => {
                assert_eq!(question.as_deref(), Some("what is covered?"));
                assert_eq!(top_k, Some(3));
                assert_eq!(document, Some(id));
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["docrag", "list", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List));
    }
}
