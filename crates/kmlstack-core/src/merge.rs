//! The merge session engine.
//!
//! A session takes an ordered list of selected files and produces one
//! [`MergedDataset`]: every file is hashed, parsed, and its points
//! tagged with the file's session identity and marker color. A file
//! that cannot be read or parsed is excluded with a recorded reason
//! and the session continues; only over-selection aborts the session,
//! and it does so before any file is touched.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::SessionConfig;
use crate::error::{Result, StackerError};
use crate::integrity::read_and_inspect;
use crate::kml::{Extraction, PointExtractor};
use crate::models::{ColorPalette, MarkerColor, MergedDataset, Selection, SourceFile, SourceId};
use crate::stats::SessionStatistics;
use crate::timestamp::{DateOnlyPolicy, TimestampNormalizer};

/// Hard cap on files per merge session.
pub const MAX_SOURCES: usize = 10;

/// A selected file that was excluded from the session, with the reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub remark: String,
    pub reason: String,
}

/// Everything a merge session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub dataset: MergedDataset,
    pub skipped_files: Vec<SkippedFile>,
    /// Placemarks dropped for missing or invalid point geometry.
    pub skipped_points: usize,
    /// Placemarks whose timestamp candidates all failed to parse.
    pub unrecognized_timestamps: usize,
    pub stats: SessionStatistics,
}

/// Runs merge sessions against a fixed palette and session policy.
pub struct MergeEngine {
    palette: ColorPalette,
    extractor: PointExtractor,
    date_only_policy: DateOnlyPolicy,
}

impl MergeEngine {
    pub fn new(palette: ColorPalette, config: &SessionConfig) -> Self {
        let normalizer = TimestampNormalizer::new(config.date_only_time.value);
        Self {
            palette,
            extractor: PointExtractor::new(normalizer),
            date_only_policy: config.date_only_policy.value,
        }
    }

    /// Maximum number of files a session can accept.
    pub fn capacity(&self) -> usize {
        MAX_SOURCES.min(self.palette.len())
    }

    /// Runs one merge session over the selected files, in order.
    ///
    /// Fails up front with [`StackerError::TooManyFiles`] when the
    /// selection exceeds [`capacity`](Self::capacity); no file is read
    /// in that case. Each selection keeps its positional identity and
    /// color even when an earlier file is excluded.
    pub fn run(&self, selections: &[Selection]) -> Result<SessionOutcome> {
        let limit = self.capacity();
        if selections.len() > limit {
            return Err(StackerError::TooManyFiles {
                selected: selections.len(),
                limit,
            });
        }

        let mut dataset = MergedDataset::new();
        let mut skipped_files = Vec::new();
        let mut skipped_points = 0;
        let mut unrecognized_timestamps = 0;

        for (position, (selection, color)) in
            selections.iter().zip(self.palette.colors()).enumerate()
        {
            match self.ingest(SourceId(position), selection, color) {
                Ok((source, extraction)) => {
                    skipped_points += extraction.skipped_points;
                    unrecognized_timestamps += extraction.unrecognized_timestamps;
                    dataset.push_source(source, extraction.points);
                }
                Err(error) => {
                    tracing::warn!(
                        path = %selection.path.display(),
                        %error,
                        "file excluded from merge session"
                    );
                    skipped_files.push(SkippedFile {
                        path: selection.path.clone(),
                        remark: selection.remark.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        let stats = SessionStatistics::collect(&dataset, self.date_only_policy);
        tracing::info!(
            merged = dataset.sources.len(),
            excluded = skipped_files.len(),
            points = stats.total.total_points,
            skipped_points,
            "merge session complete"
        );

        Ok(SessionOutcome {
            dataset,
            skipped_files,
            skipped_points,
            unrecognized_timestamps,
            stats,
        })
    }

    fn ingest(
        &self,
        id: SourceId,
        selection: &Selection,
        color: &MarkerColor,
    ) -> Result<(SourceFile, Extraction)> {
        let (bytes, integrity) = read_and_inspect(&selection.path)?;
        let extraction = self.extractor.extract(&selection.path, &bytes)?;
        tracing::debug!(
            path = %selection.path.display(),
            points = extraction.points.len(),
            sha256 = %integrity.sha256,
            "source file ingested"
        );

        let source = SourceFile {
            id,
            path: selection.path.clone(),
            remark: selection.remark.clone(),
            color: color.clone(),
            integrity,
        };
        Ok((source, extraction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_palette() -> ColorPalette {
        ColorPalette::new(vec![
            MarkerColor {
                name: "red".to_string(),
                hex: "#FF0000".to_string(),
            },
            MarkerColor {
                name: "blue".to_string(),
                hex: "#0000FF".to_string(),
            },
        ])
    }

    #[test]
    fn capacity_is_bounded_by_palette() {
        let engine = MergeEngine::new(tiny_palette(), &SessionConfig::with_defaults());
        assert_eq!(engine.capacity(), 2);

        let engine = MergeEngine::new(ColorPalette::default(), &SessionConfig::with_defaults());
        assert_eq!(engine.capacity(), MAX_SOURCES);
    }

    #[test]
    fn over_selection_reports_palette_limit() {
        let engine = MergeEngine::new(tiny_palette(), &SessionConfig::with_defaults());
        let selections = vec![
            Selection::new("a.kml", "a"),
            Selection::new("b.kml", "b"),
            Selection::new("c.kml", "c"),
        ];

        let result = engine.run(&selections);
        assert!(matches!(
            result,
            Err(StackerError::TooManyFiles {
                selected: 3,
                limit: 2
            })
        ));
    }

    #[test]
    fn empty_selection_yields_empty_outcome() {
        let engine = MergeEngine::new(ColorPalette::default(), &SessionConfig::with_defaults());
        let outcome = engine.run(&[]).unwrap();

        assert!(outcome.dataset.sources.is_empty());
        assert!(outcome.dataset.points.is_empty());
        assert!(outcome.skipped_files.is_empty());
        assert_eq!(outcome.stats.total.total_points, 0);
    }
}
