use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// kmlstack - Color-coded KML merge tool
#[derive(Parser, Debug)]
#[command(name = "kmlstack")]
#[command(about = "Merge KML point files into one color-coded document", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List KML files in a directory
    List(ListArgs),

    /// Inspect a single KML file without merging
    Inspect(InspectArgs),

    /// Merge KML files into one color-coded document
    Merge(MergeArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Directory to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Include a previously merged output file in the listing
    #[arg(long)]
    pub include_merged: bool,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the KML file
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// KML files to merge, in selection order (at most 10)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Remark for the file at the same position (repeatable)
    /// Files without a remark fall back to their file name
    #[arg(long, short = 'r', value_name = "TEXT")]
    pub remark: Vec<String>,

    /// Output path for the merged document
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Write a CSV session report to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Time of day completing date-only timestamps (HH:MM or HH:MM:SS)
    #[arg(long, value_name = "TIME")]
    pub date_only_time: Option<String>,

    /// How date-only timestamps count in statistics (timestamped or missing)
    #[arg(long, value_name = "POLICY")]
    pub date_only_policy: Option<String>,
}
