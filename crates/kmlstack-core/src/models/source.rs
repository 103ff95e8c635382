use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::palette::MarkerColor;
use crate::integrity::FileIntegrity;

/// Position of a source in the selection order. Doubles as the color
/// assignment index, so the mapping from file to color survives the exclusion
/// of an earlier file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub usize);

/// A user selection queued for a merge session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// Path to the KML file
    pub path: PathBuf,

    /// User-supplied provenance label
    pub remark: String,
}

impl Selection {
    pub fn new(path: impl Into<PathBuf>, remark: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            remark: remark.into(),
        }
    }

    /// Selection with the file name (without extension) as its remark.
    pub fn with_default_remark(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let remark = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
        Self { path, remark }
    }
}

/// An accepted source file with its session-scoped attributes.
///
/// Created once integrity inspection and extraction both succeed; immutable
/// thereafter. It lives only for the duration of the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Selection position within the session
    pub id: SourceId,

    /// Path to the KML file
    pub path: PathBuf,

    /// User-supplied provenance label
    pub remark: String,

    /// Marker color assigned by selection position
    pub color: MarkerColor,

    /// Content hash and filesystem timestamps
    pub integrity: FileIntegrity,
}
