//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::InspectOutput;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use kmlstack_core::config::SessionConfig;
use kmlstack_core::integrity::read_and_inspect;
use kmlstack_core::kml::PointExtractor;
use kmlstack_core::timestamp::TimestampNormalizer;

pub fn execute(args: InspectArgs, config: &SessionConfig, output: &OutputWriter) -> Result<()> {
    let (bytes, integrity) = read_and_inspect(&args.file)
        .with_context(|| format!("Failed to inspect {}", args.file.display()))?;

    let extractor = PointExtractor::new(TimestampNormalizer::new(config.date_only_time.value));
    let extraction = extractor.extract(&args.file, &bytes)?;

    let policy = config.date_only_policy.value;
    let total = extraction.points.len();
    let with_timestamp = extraction
        .points
        .iter()
        .filter(|point| {
            point
                .timestamp
                .is_some_and(|ts| policy.accepts(ts.precision))
        })
        .count();

    if output.is_json() {
        output.result(InspectOutput {
            file: args.file.display().to_string(),
            sha256: integrity.sha256,
            size_bytes: integrity.size_bytes,
            created_at: integrity.created_at,
            modified_at: integrity.modified_at,
            total_points: total,
            points_with_timestamp: with_timestamp,
            points_without_timestamp: total - with_timestamp,
            skipped_points: extraction.skipped_points,
            unrecognized_timestamps: extraction.unrecognized_timestamps,
        })?;
        return Ok(());
    }

    output.section("File Integrity");
    output.kv("File", args.file.display());
    output.kv("SHA-256", &integrity.sha256);
    output.kv("Size", format!("{} bytes", integrity.size_bytes));
    output.kv("Created", format_time(integrity.created_at));
    output.kv("Modified", format_time(integrity.modified_at));

    output.section("Extraction");
    output.kv("Total Points", total);
    output.kv("With Timestamp", with_timestamp);
    output.kv("Without Timestamp", total - with_timestamp);
    output.kv("Skipped Placemarks", extraction.skipped_points);
    output.kv("Unrecognized Timestamps", extraction.unrecognized_timestamps);

    Ok(())
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
