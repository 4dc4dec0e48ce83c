use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Extract detail markers, text runs and title-block data from construction drawings.
#[derive(Debug, Parser)]
#[command(name = "planmark", about, version)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the full extraction and print the result as JSON
    Extract {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Maximum horizontal gap for merging fragments into one run
        #[arg(long, default_value_t = 5.0)]
        threshold: f64,

        /// Print JSON on a single line instead of indented
        #[arg(long)]
        compact: bool,
    },

    /// List every marker occurrence with its page and position
    Markers {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Page range (e.g. '1,3-5'). Default: all pages
        #[arg(long)]
        pages: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Maximum horizontal gap for merging fragments into one run
        #[arg(long, default_value_t = 5.0)]
        threshold: f64,
    },

    /// Display page geometry, title-block fields and summary counts
    Info {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,
    },
}

/// Output format for the info subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum TextFormat {
    /// Plain text output
    Text,
    /// JSON output
    Json,
}

/// Output format for the markers subcommand.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (tab-separated)
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}
