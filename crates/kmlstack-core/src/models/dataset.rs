use serde::{Deserialize, Serialize};

use super::point::GeoPoint;
use super::source::{SourceFile, SourceId};

/// A point tagged with the source it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    pub source: SourceId,
    pub point: GeoPoint,
}

/// The union of all points across all accepted sources of one session.
///
/// Per-source point order is document order; sources follow one another in
/// selection order. The sequence is not chronological, callers needing time
/// order must sort explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergedDataset {
    /// Accepted sources in selection order
    pub sources: Vec<SourceFile>,

    /// All merged points
    pub points: Vec<MergedPoint>,
}

impl MergedDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one accepted source and its extracted points.
    pub fn push_source(&mut self, source: SourceFile, points: Vec<GeoPoint>) {
        let id = source.id;
        self.points
            .extend(points.into_iter().map(|point| MergedPoint { source: id, point }));
        self.sources.push(source);
    }

    pub fn source(&self, id: SourceId) -> Option<&SourceFile> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// Points belonging to one source, in their original document order.
    pub fn points_for(&self, id: SourceId) -> impl Iterator<Item = &GeoPoint> {
        self.points
            .iter()
            .filter(move |merged| merged.source == id)
            .map(|merged| &merged.point)
    }

    pub fn total_points(&self) -> usize {
        self.points.len()
    }
}
