//! CLI module for Svar.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Svar - a tool-calling AI assistant
///
/// A terminal assistant that answers questions by calling tools: arithmetic,
/// web/Wikipedia/arXiv search, spreadsheet analysis, file download, and
/// image/audio/YouTube analysis.
/// The name "Svar" comes from the Norwegian word for "answer."
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
    /// Initialize Svar and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Ask a single question and let the assistant use its tools
    Ask {
        /// The question or task
        question: String,

        /// Input file for the assistant to analyze (CSV, Excel, image, ...)
        #[arg(short, long)]
        file: Option<String>,

        /// Model to use for the conversation loop
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        /// Model to use for the conversation loop
        #[arg(short, long)]
        model: Option<String>,
    },

    /// List the available tools
    Tools,
}
