//! File integrity inspection
//!
//! Captures a SHA-256 content hash and filesystem timestamps for each source
//! file so location evidence stays traceable to the exact bytes it came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use crate::error::{Result, StackerError};

/// Integrity record for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIntegrity {
    /// SHA-256 of the raw file bytes, lowercase hex
    pub sha256: String,

    /// File size in bytes
    pub size_bytes: u64,

    /// Filesystem creation time; `None` where the filesystem does not
    /// report one (ext4, most network mounts)
    pub created_at: Option<DateTime<Utc>>,

    /// Filesystem modification time
    pub modified_at: Option<DateTime<Utc>>,
}

/// Read a file once, returning its raw bytes together with the integrity
/// record computed from that same buffer.
///
/// The hash is taken before any parsing and never from a re-read, so a
/// corrupted-but-parseable file still produces a detectable hash mismatch.
/// Failure excludes the file from the session without ending it.
pub fn read_and_inspect(path: &Path) -> Result<(Vec<u8>, FileIntegrity)> {
    let bytes = fs::read(path).map_err(|source| StackerError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let metadata = fs::metadata(path).map_err(|source| StackerError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let sha256 = format!("{:x}", hasher.finalize());

    let integrity = FileIntegrity {
        sha256,
        size_bytes: bytes.len() as u64,
        created_at: metadata.created().ok().map(DateTime::<Utc>::from),
        modified_at: metadata.modified().ok().map(DateTime::<Utc>::from),
    };

    Ok((bytes, integrity))
}
