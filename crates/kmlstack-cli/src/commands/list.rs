//! List command implementation

use crate::cli::ListArgs;
use crate::output::OutputWriter;
use crate::output_types::{KmlFileInfo, ListOutput};
use anyhow::{Context, Result};
use kmlstack_core::config::SessionConfig;
use kmlstack_core::integrity::read_and_inspect;
use kmlstack_core::kml::PointExtractor;
use kmlstack_core::timestamp::TimestampNormalizer;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::Tabled;

pub fn execute(args: ListArgs, config: &SessionConfig, output: &OutputWriter) -> Result<()> {
    let entries = fs::read_dir(&args.dir)
        .with_context(|| format!("Failed to read directory {}", args.dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("kml"))
        })
        .collect();
    paths.sort();

    // Hide a previous merge result so it does not get re-merged
    if !args.include_merged {
        let merged_name = config.merge_output.value.as_str();
        paths.retain(|path| path.file_name().and_then(|n| n.to_str()) != Some(merged_name));
    }

    let extractor = PointExtractor::new(TimestampNormalizer::new(config.date_only_time.value));
    let mut files = Vec::new();
    for path in paths {
        match summarize(&extractor, &path) {
            Ok(info) => files.push(info),
            Err(error) => output.warning(format!("Skipping {}: {}", path.display(), error)),
        }
    }

    if output.is_json() {
        output.result(ListOutput { files })?;
        return Ok(());
    }

    if files.is_empty() {
        output.info(format!("No KML files found in {}", args.dir.display()));
        return Ok(());
    }

    output.section("KML Files");

    #[derive(Tabled)]
    struct FileRow {
        #[tabled(rename = "File")]
        file: String,
        #[tabled(rename = "Points")]
        points: usize,
        #[tabled(rename = "Size")]
        size: String,
    }

    let rows: Vec<FileRow> = files
        .iter()
        .map(|info| FileRow {
            file: info.file.clone(),
            points: info.points,
            size: human_size(info.size_bytes),
        })
        .collect();
    output.table(rows);

    Ok(())
}

fn summarize(extractor: &PointExtractor, path: &Path) -> kmlstack_core::Result<KmlFileInfo> {
    let (bytes, integrity) = read_and_inspect(path)?;
    let extraction = extractor.extract(path, &bytes)?;
    Ok(KmlFileInfo {
        file: path.display().to_string(),
        points: extraction.points.len(),
        size_bytes: integrity.size_bytes,
    })
}

fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
