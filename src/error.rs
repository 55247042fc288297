//! Error types for the snapshot engine.
//!
//! Every fallible engine operation returns [`Result`]. Variants are grouped
//! into coarse [`ErrorKind`]s so callers can decide how to report a failure
//! without matching on every variant.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the tracking and archival engine
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum SnapError {
    // Configuration errors
    #[error("Failed to read ignore file {path}: {source}")]
    IgnoreFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Filesystem errors
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Archive packaging failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("Malformed tracker line {line}: {reason}")]
    TrackerFormat { line: usize, reason: String },

    // Validation errors
    #[error("Invalid snapshot name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Snapshot '{0}' already exists")]
    SnapshotExists(String),

    // Nothing to do
    #[error("No changes since the last snapshot")]
    NoChanges,

    // Working directory state
    #[error("Not a subsys directory: {0} (run 'subsys init' first)")]
    NotInitialized(PathBuf),

    #[error("Directory is already initialized: {0}")]
    AlreadyInitialized(PathBuf),
}

/// Coarse classification of a [`SnapError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Ignore file or configuration could not be read or is invalid
    Config,
    /// A filesystem read or write failed during scan, hash, tracker I/O or packaging
    Io,
    /// The snapshot name was rejected before any side effect
    Validation,
    /// The diff produced an empty change set
    NoChanges,
    /// The working directory is not in the state the operation expects
    State,
}

impl SnapError {
    /// Returns the category this error belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::IgnoreFile { .. }
            | Self::ConfigRead { .. }
            | Self::ConfigParse { .. }
            | Self::InvalidConfig(_) => ErrorKind::Config,
            Self::Io { .. }
            | Self::Walk(_)
            | Self::Archive(_)
            | Self::NonUtf8Path(_)
            | Self::TrackerFormat { .. } => ErrorKind::Io,
            Self::InvalidName { .. } | Self::SnapshotExists(_) => ErrorKind::Validation,
            Self::NoChanges => ErrorKind::NoChanges,
            Self::NotInitialized(_) | Self::AlreadyInitialized(_) => ErrorKind::State,
        }
    }

    /// Whether the error should abort the caller.
    ///
    /// An empty change set is a normal outcome, everything else is a fault.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::NoChanges)
    }

    /// Wraps an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SnapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_kinds() {
        let ignore = SnapError::IgnoreFile {
            path: PathBuf::from("subsysignore"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(ignore.kind(), ErrorKind::Config);

        let io_err = SnapError::io("a.txt", io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(io_err.kind(), ErrorKind::Io);
        assert_eq!(SnapError::NonUtf8Path(PathBuf::from("x")).kind(), ErrorKind::Io);

        let name = SnapError::InvalidName {
            name: "a b".to_string(),
            reason: "contains whitespace".to_string(),
        };
        assert_eq!(name.kind(), ErrorKind::Validation);

        assert_eq!(SnapError::NoChanges.kind(), ErrorKind::NoChanges);
    }

    #[test]
    fn test_only_no_changes_is_non_fatal() {
        assert!(!SnapError::NoChanges.is_fatal());
        assert!(SnapError::SnapshotExists("v1".to_string()).is_fatal());
        assert!(SnapError::NotInitialized(PathBuf::from("/tmp/x")).is_fatal());
    }

    #[test]
    fn test_messages_carry_path() {
        let err = SnapError::io("dir/file.txt", io::Error::other("boom"));
        let msg = err.to_string();
        assert!(msg.contains("dir/file.txt"));
        assert!(msg.contains("boom"));
    }
}
