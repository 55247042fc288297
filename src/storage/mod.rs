/// Snapshot naming and archive packaging
pub mod snapshots;
/// Persisted path-to-digest state
pub mod tracker;

pub use snapshots::{SnapshotInfo, SnapshotManager, SnapshotName, validate_name};
pub use tracker::Tracker;

use crate::utils::hash::Digest;

/// Represents one tracked file in the persisted state.
///
/// The digest is the content hash computed when the file was last tracked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRecord {
    /// Path relative to the working-directory root, `/` separated
    pub path: String,
    /// SHA-256 of the file content
    pub digest: Digest,
}

impl FileRecord {
    /// Create a record
    pub fn new(path: impl Into<String>, digest: Digest) -> Self {
        Self {
            path: path.into(),
            digest,
        }
    }
}
