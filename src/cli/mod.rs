//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - Question Answering over Video Transcripts
///
/// Ask questions over indexed video transcript collections and get
/// AI-generated, self-scored answers with source links.
/// The name "Svar" comes from the Norwegian/Scandinavian word for "answer."
#[derive(Parser, Debug)]
#[command(name = "svar")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Svar and verify configuration
    Init,

    /// Ask a question over a transcript collection
    Ask {
        /// The question to ask
        question: String,

        /// Collection (playlist) to search within
        #[arg(short = 'C', long)]
        collection: String,

        /// Retrieval mode (lexical, vector)
        #[arg(short, long, default_value = "lexical")]
        mode: String,

        /// Number of evidence snippets to retrieve
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Skip persisting the conversation
        #[arg(long)]
        no_save: bool,
    },

    /// Start the HTTP API server (the front-end boundary)
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Show recent conversations
    Recent {
        /// Maximum number of conversations
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Filter by relevance label (RELEVANT, PARTLY_RELEVANT, NON_RELEVANT, UNKNOWN)
        #[arg(short, long)]
        relevance: Option<String>,
    },

    /// Show feedback statistics
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print the configuration file path
    Path,
}
