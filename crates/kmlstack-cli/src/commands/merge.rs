//! Merge command implementation

use crate::cli::MergeArgs;
use crate::kml_writer;
use crate::output::OutputWriter;
use crate::output_types::{ExcludedFileInfo, MergeOutput, MergedSourceInfo};
use crate::progress::{create_spinner, finish_error, finish_success};
use crate::report;
use anyhow::{bail, Context, Result};
use kmlstack_core::config::{
    parse_date_only_policy, parse_time_of_day, CliConfigOverrides, SessionConfig,
};
use kmlstack_core::merge::MergeEngine;
use kmlstack_core::models::{ColorPalette, Selection};
use std::fs;
use std::path::PathBuf;
use tabled::Tabled;

pub fn execute(args: MergeArgs, mut config: SessionConfig, output: &OutputWriter) -> Result<()> {
    if args.remark.len() > args.files.len() {
        bail!(
            "{} remarks given for {} files",
            args.remark.len(),
            args.files.len()
        );
    }

    config.update_from_cli(CliConfigOverrides {
        date_only_time: args
            .date_only_time
            .as_deref()
            .map(parse_time_of_day)
            .transpose()?,
        date_only_policy: args
            .date_only_policy
            .as_deref()
            .map(parse_date_only_policy)
            .transpose()?,
        merge_output: None,
    });

    let selections: Vec<Selection> = args
        .files
        .iter()
        .enumerate()
        .map(|(position, path)| match args.remark.get(position) {
            Some(remark) => Selection::new(path, remark.as_str()),
            None => Selection::with_default_remark(path),
        })
        .collect();

    let engine = MergeEngine::new(ColorPalette::default(), &config);

    let spinner = (!output.is_json()).then(|| create_spinner("Merging KML files..."));
    let outcome = match engine.run(&selections) {
        Ok(outcome) => {
            if let Some(pb) = &spinner {
                finish_success(
                    pb,
                    &format!(
                        "Merged {} of {} files ({} points)",
                        outcome.dataset.sources.len(),
                        selections.len(),
                        outcome.stats.total.total_points
                    ),
                );
            }
            outcome
        }
        Err(error) => {
            if let Some(pb) = &spinner {
                finish_error(pb, "Merge session aborted");
            }
            return Err(error.into());
        }
    };

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.merge_output.value));
    let document = kml_writer::render_merged_kml(&outcome.dataset)?;
    fs::write(&output_path, document)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    if let Some(path) = &args.report {
        report::write_report(path, &outcome)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }

    if output.is_json() {
        let sources: Vec<MergedSourceInfo> = outcome
            .dataset
            .sources
            .iter()
            .map(|source| {
                let counts = outcome
                    .stats
                    .counts_for(source.id)
                    .copied()
                    .unwrap_or_default();
                MergedSourceInfo {
                    file: source.path.display().to_string(),
                    remark: source.remark.clone(),
                    color: source.color.name.clone(),
                    sha256: source.integrity.sha256.clone(),
                    total_points: counts.total_points,
                    points_with_timestamp: counts.points_with_timestamp,
                    points_without_timestamp: counts.points_without_timestamp,
                }
            })
            .collect();
        let excluded: Vec<ExcludedFileInfo> = outcome
            .skipped_files
            .iter()
            .map(|skipped| ExcludedFileInfo {
                file: skipped.path.display().to_string(),
                remark: skipped.remark.clone(),
                reason: skipped.reason.clone(),
            })
            .collect();

        output.result(MergeOutput {
            output: output_path.display().to_string(),
            report: args.report.as_ref().map(|p| p.display().to_string()),
            sources,
            excluded,
            total_points: outcome.stats.total.total_points,
            points_with_timestamp: outcome.stats.total.points_with_timestamp,
            points_without_timestamp: outcome.stats.total.points_without_timestamp,
            skipped_points: outcome.skipped_points,
            unrecognized_timestamps: outcome.unrecognized_timestamps,
        })?;
        return Ok(());
    }

    output.section("Merged Sources");

    #[derive(Tabled)]
    struct SourceRow {
        #[tabled(rename = "Color")]
        color: String,
        #[tabled(rename = "File")]
        file: String,
        #[tabled(rename = "Remark")]
        remark: String,
        #[tabled(rename = "Points")]
        points: usize,
        #[tabled(rename = "With TS")]
        with_timestamp: usize,
        #[tabled(rename = "Without TS")]
        without_timestamp: usize,
    }

    let rows: Vec<SourceRow> = outcome
        .dataset
        .sources
        .iter()
        .map(|source| {
            let counts = outcome
                .stats
                .counts_for(source.id)
                .copied()
                .unwrap_or_default();
            SourceRow {
                color: source.color.name.clone(),
                file: source.path.display().to_string(),
                remark: source.remark.clone(),
                points: counts.total_points,
                with_timestamp: counts.points_with_timestamp,
                without_timestamp: counts.points_without_timestamp,
            }
        })
        .collect();
    output.table(rows);

    if !outcome.skipped_files.is_empty() {
        output.section("Excluded Files");
        for skipped in &outcome.skipped_files {
            output.warning(format!("{}: {}", skipped.path.display(), skipped.reason));
        }
    }

    output.section("Session Totals");
    output.kv("Total Points", outcome.stats.total.total_points);
    output.kv("With Timestamp", outcome.stats.total.points_with_timestamp);
    output.kv(
        "Without Timestamp",
        outcome.stats.total.points_without_timestamp,
    );
    if outcome.skipped_points > 0 {
        output.kv("Skipped Placemarks", outcome.skipped_points);
    }
    if outcome.unrecognized_timestamps > 0 {
        output.kv("Unrecognized Timestamps", outcome.unrecognized_timestamps);
    }
    if let Some(path) = &args.report {
        output.kv("Report", path.display());
    }

    output.success(format!("Merged document written to {}", output_path.display()));

    Ok(())
}
