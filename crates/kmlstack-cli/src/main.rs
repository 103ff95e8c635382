//! kmlstack CLI - Command-line interface
//!
//! This is the main CLI adapter for the kmlstack merge engine.

mod cli;
mod commands;
mod kml_writer;
mod output;
mod output_types;
mod progress;
mod report;

use anyhow::Result;
use clap::Parser;
use cli::Cli;

fn main() -> Result<()> {
    // Initialize tracing; diagnostics go to stderr so stdout stays
    // parseable in --json mode
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute the command
    commands::execute(cli)?;

    Ok(())
}
