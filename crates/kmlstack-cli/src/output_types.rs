//! Structured output types for JSON mode
//!
//! These are the stable shapes printed under `--json`. Human output
//! formats the same data through tables and key/value lines instead.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One KML file found by the list command
#[derive(Debug, Serialize)]
pub struct KmlFileInfo {
    pub file: String,
    pub points: usize,
    pub size_bytes: u64,
}

/// Output of the list command
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub files: Vec<KmlFileInfo>,
}

/// Output of the inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub file: String,
    pub sha256: String,
    pub size_bytes: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
    pub total_points: usize,
    pub points_with_timestamp: usize,
    pub points_without_timestamp: usize,
    pub skipped_points: usize,
    pub unrecognized_timestamps: usize,
}

/// One merged source file in merge output
#[derive(Debug, Serialize)]
pub struct MergedSourceInfo {
    pub file: String,
    pub remark: String,
    pub color: String,
    pub sha256: String,
    pub total_points: usize,
    pub points_with_timestamp: usize,
    pub points_without_timestamp: usize,
}

/// One excluded file in merge output
#[derive(Debug, Serialize)]
pub struct ExcludedFileInfo {
    pub file: String,
    pub remark: String,
    pub reason: String,
}

/// Output of the merge command
#[derive(Debug, Serialize)]
pub struct MergeOutput {
    pub output: String,
    pub report: Option<String>,
    pub sources: Vec<MergedSourceInfo>,
    pub excluded: Vec<ExcludedFileInfo>,
    pub total_points: usize,
    pub points_with_timestamp: usize,
    pub points_without_timestamp: usize,
    pub skipped_points: usize,
    pub unrecognized_timestamps: usize,
}

/// One configuration entry with its provenance
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub value: String,
    pub source: String,
}

/// Output of the config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub entries: BTreeMap<String, ConfigEntry>,
}
