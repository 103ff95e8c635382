//! Session statistics over a merged dataset.
//!
//! Counts are derived, never stored on the dataset itself. The same
//! dataset can be re-counted under a different [`DateOnlyPolicy`]
//! without touching the points, which keeps the policy a presentation
//! concern rather than an ingestion one.

use serde::{Deserialize, Serialize};

use crate::models::{MergedDataset, SourceId};
use crate::timestamp::DateOnlyPolicy;

/// Point tallies for one counting scope.
///
/// Invariant: `points_with_timestamp + points_without_timestamp ==
/// total_points`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointCounts {
    pub total_points: usize,
    pub points_with_timestamp: usize,
    pub points_without_timestamp: usize,
}

impl PointCounts {
    fn record(&mut self, with_timestamp: bool) {
        self.total_points += 1;
        if with_timestamp {
            self.points_with_timestamp += 1;
        } else {
            self.points_without_timestamp += 1;
        }
    }
}

/// Tallies for a single source file within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCounts {
    pub source: SourceId,
    pub counts: PointCounts,
}

/// Per-source and overall tallies for a merge session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub per_source: Vec<SourceCounts>,
    pub total: PointCounts,
}

impl SessionStatistics {
    /// Counts every point in the dataset under the given policy.
    ///
    /// Sources that contributed zero points still get an entry, so
    /// reports can show an explicit zero row instead of omitting the
    /// file.
    pub fn collect(dataset: &MergedDataset, policy: DateOnlyPolicy) -> Self {
        let mut per_source: Vec<SourceCounts> = dataset
            .sources
            .iter()
            .map(|source| SourceCounts {
                source: source.id,
                counts: PointCounts::default(),
            })
            .collect();

        let mut total = PointCounts::default();
        for merged in &dataset.points {
            let with_timestamp = merged
                .point
                .timestamp
                .is_some_and(|ts| policy.accepts(ts.precision));
            total.record(with_timestamp);
            if let Some(entry) = per_source
                .iter_mut()
                .find(|entry| entry.source == merged.source)
            {
                entry.counts.record(with_timestamp);
            }
        }

        Self { per_source, total }
    }

    /// Looks up the tallies for one source file.
    pub fn counts_for(&self, id: SourceId) -> Option<&PointCounts> {
        self.per_source
            .iter()
            .find(|entry| entry.source == id)
            .map(|entry| &entry.counts)
    }
}
