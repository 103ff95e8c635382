//! Command implementations

mod config;
mod inspect;
mod list;
mod merge;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use kmlstack_core::config::SessionConfig;
use std::path::Path;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_session_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List(args) => list::execute(args, &config, &output),
        Commands::Inspect(args) => inspect::execute(args, &config, &output),
        Commands::Merge(args) => merge::execute(args, config, &output),
        Commands::Config => config::execute(&config, &output),
    }
}

/// Build the layered session configuration
///
/// A config file is only read when one is named; a bad file is a hard
/// error rather than a silent fallback to defaults.
fn load_session_config(config_path: Option<&Path>) -> Result<SessionConfig> {
    let mut config = SessionConfig::with_defaults();
    if let Some(path) = config_path {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    }
    Ok(config.load_from_env())
}
