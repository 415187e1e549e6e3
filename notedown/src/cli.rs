//! Command-line interface definitions for notedown

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI structure for the notedown application
#[derive(Parser)]
#[command(name = "notedown")]
#[command(version)]
#[command(about = "Markdown document conversion and search", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for notedown
#[derive(Subcommand)]
pub enum Commands {
    /// Parse a markdown file and write its canonical form
    Convert {
        /// Input markdown file
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the heading outline of a markdown file
    Outline {
        /// Input markdown file
        input: PathBuf,

        /// Emit the outline as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Search a markdown file and report structural positions
    Search {
        /// Input markdown file
        input: PathBuf,

        /// Text to find, matched case-insensitively
        query: String,

        /// Emit matches as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}
