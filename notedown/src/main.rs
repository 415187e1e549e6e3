//! notedown - Markdown document conversion and search tool
//!
//! A CLI front end over the notedown library: converts markdown files to
//! their canonical form, prints heading outlines, and searches documents
//! reporting structural positions.

#![deny(unsafe_code)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use notedown::{markdown, outline, search, OutlineNode};
use std::path::Path;

/// Main entry point for the notedown CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            verbose,
        } => {
            init_logging(verbose);
            handle_convert_command(&input, output.as_deref())?;
        }

        Commands::Outline {
            input,
            json,
            verbose,
        } => {
            init_logging(verbose);
            handle_outline_command(&input, json)?;
        }

        Commands::Search {
            input,
            query,
            json,
            verbose,
        } => {
            init_logging(verbose);
            handle_search_command(&input, &query, json)?;
        }
    }

    Ok(())
}

/// Initialize logging, raising the level when verbose output is requested
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

/// Handle the convert command
fn handle_convert_command(input: &Path, output: Option<&Path>) -> Result<()> {
    let source = read_input(input)?;
    let document = markdown::parse(&source);
    let rendered = markdown::serialize(&document);

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Handle the outline command
fn handle_outline_command(input: &Path, json: bool) -> Result<()> {
    let source = read_input(input)?;
    let nodes = outline::outline(&source);

    if json {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
    } else {
        print_outline(&nodes, 0);
    }

    Ok(())
}

/// Handle the search command
fn handle_search_command(input: &Path, query: &str, json: bool) -> Result<()> {
    let source = read_input(input)?;
    let document = markdown::parse(&source);
    let matches = search::find_matches(&document, query);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    println!("{} match(es) for {:?}", matches.len(), query);
    for found in &matches {
        println!(
            "  bytes {}..{}, path {:?}, span {}, offset {}: {:?}",
            found.flat_from,
            found.flat_to,
            found.from.path,
            found.from.span,
            found.from.offset,
            found.text
        );
    }

    Ok(())
}

/// Read a markdown source file
fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Print an outline tree with two-space indentation
fn print_outline(nodes: &[OutlineNode], indent: usize) {
    for node in nodes {
        println!("{}{} [{}]", "  ".repeat(indent), node.text, node.id);
        print_outline(&node.children, indent + 1);
    }
}
