//! Error types for kmlstack

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StackerError {
    // Session errors
    #[error("Too many files selected: {selected} exceeds the session limit of {limit}")]
    TooManyFiles { selected: usize, limit: usize },

    // Per-file errors (file excluded, session continues)
    #[error("Cannot access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed KML document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StackerError>;
