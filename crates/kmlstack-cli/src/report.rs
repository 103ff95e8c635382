//! CSV session report
//!
//! One row per merged source file with its hash, filesystem times, and
//! point tallies, followed by a TOTAL row. Excluded files never appear
//! here; they are reported on the console instead.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use csv::Writer;
use kmlstack_core::merge::SessionOutcome;
use std::fs::File;
use std::io::Write as IoWrite;
use std::path::Path;

/// Column order of the session report.
pub const REPORT_COLUMNS: [&str; 8] = [
    "source_file",
    "remark",
    "content_hash",
    "created_at",
    "modified_at",
    "total_points",
    "points_with_timestamp",
    "points_without_timestamp",
];

/// Writes the session report to a file.
pub fn write_report(path: &Path, outcome: &SessionOutcome) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    render_report(file, outcome)
}

/// Renders the session report as CSV.
pub fn render_report<W: IoWrite>(writer: W, outcome: &SessionOutcome) -> Result<()> {
    let mut csv = Writer::from_writer(writer);
    csv.write_record(REPORT_COLUMNS)?;

    for source in &outcome.dataset.sources {
        let counts = outcome
            .stats
            .counts_for(source.id)
            .copied()
            .unwrap_or_default();
        csv.write_record([
            source.path.display().to_string(),
            source.remark.clone(),
            source.integrity.sha256.clone(),
            format_time(source.integrity.created_at),
            format_time(source.integrity.modified_at),
            counts.total_points.to_string(),
            counts.points_with_timestamp.to_string(),
            counts.points_without_timestamp.to_string(),
        ])?;
    }

    let total = &outcome.stats.total;
    csv.write_record([
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        total.total_points.to_string(),
        total.points_with_timestamp.to_string(),
        total.points_without_timestamp.to_string(),
    ])?;

    csv.flush()?;
    Ok(())
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}
