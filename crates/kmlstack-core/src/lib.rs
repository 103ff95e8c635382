//! kmlstack core - KML ingestion, timestamp normalization, and the
//! merge/statistics engine.
//!
//! The crate is a pure library: it reads and parses the selected files but
//! performs no prompting, rendering, or report emission. Those live in the
//! CLI shell.

pub mod config;
pub mod error;
pub mod integrity;
pub mod kml;
pub mod merge;
pub mod models;
pub mod stats;
pub mod timestamp;

pub use error::{Result, StackerError};
