#![warn(missing_docs)]
// Allow pedantic strict lints that create false positives in this codebase
#![allow(clippy::arithmetic_side_effects)] // Simple counters cannot overflow
#![allow(clippy::float_arithmetic)] // Required for file size formatting
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # Subsys - Directory Snapshot Tracking and Archival
//!
//! Subsys records the content of a working directory, reports which files were
//! added, modified or deleted since the last recorded state, and packages the
//! current tree into named zip archives.
//!
//! ## Features
//!
//! - **Content-Addressed Change Detection**: files are compared by SHA-256 digest
//! - **Parallel Hashing**: large trees are hashed on a Rayon pool with deterministic output
//! - **Plain-Text State**: the tracker is one `path digest` line per file
//! - **Crash-Safe Writes**: archives and tracker are written to temp files and renamed
//!
//! ## Architecture
//!
//! - [`tracking`]: ignore filter, eligible-file walk and the diff engine
//! - [`storage`]: persisted tracker and snapshot archives
//! - [`snapshot`]: the validate, detect, archive, persist workflow
//! - [`config`]: configuration loading and validation
//! - [`commands`]: command implementations (init, status, snap, list)
//! - [`output`]: colored console output
//! - [`utils`]: hashing, paths and the thread pool
//!
//! ## Example Usage
//!
//! ```no_run
//! use subsys::SnapContext;
//!
//! # fn main() -> subsys::Result<()> {
//! let ctx = SnapContext::open("/home/user/project")?;
//! let report = subsys::snapshot::create(&ctx, "before-refactor")?;
//!
//! println!("{} changes archived to {}", report.changes.len(), report.archive.display());
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Commands module containing all CLI command implementations.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Error types for engine operations.
pub mod error;

/// Output formatting and styling.
pub mod output;

/// Snapshot creation workflow.
pub mod snapshot;

/// Persisted tracker and snapshot archives.
pub mod storage;

/// Ignore filtering, directory scanning and change detection.
pub mod tracking;

/// Utility functions and helpers.
pub mod utils;

pub use error::{ErrorKind, Result, SnapError};

use std::path::{Path, PathBuf};

/// Current version of the subsys binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// State directory inside the working-directory root.
pub const STATE_DIR: &str = ".subsys";

/// Tracker file name inside the state directory.
pub const TRACKER_FILE: &str = ".track";

/// Directory name for snapshot archives inside the state directory.
pub const SNAPSHOTS_DIR: &str = "snapshots";

/// Configuration file name inside the state directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Default ignore file name in the working-directory root.
pub const DEFAULT_IGNORE_FILE: &str = "subsysignore";

/// Extension of snapshot archives.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Path of the tracker file for `root`.
#[must_use]
pub fn tracker_path(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(TRACKER_FILE)
}

/// Path of the snapshots directory for `root`.
#[must_use]
pub fn snapshots_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR).join(SNAPSHOTS_DIR)
}

/// Immutable context for operations on one working directory.
///
/// Holds the root and the configuration loaded from its state directory.
/// Every operation receives the context by reference; nothing in it changes
/// between calls.
///
/// # Examples
///
/// ```no_run
/// use subsys::SnapContext;
/// use subsys::config::Config;
///
/// # fn main() -> subsys::Result<()> {
/// // Open an initialized directory
/// let ctx = SnapContext::open("/home/user/project")?;
///
/// // Build a context with explicit settings (for testing)
/// let ctx = SnapContext::new("/tmp/work".into(), Config::default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SnapContext {
    /// Working-directory root.
    pub root: PathBuf,

    /// Loaded configuration settings.
    pub config: config::Config,
}

impl SnapContext {
    /// Creates a context from an explicit root and configuration.
    #[must_use]
    pub const fn new(root: PathBuf, config: config::Config) -> Self {
        Self { root, config }
    }

    /// Opens an initialized working directory and loads its configuration.
    ///
    /// # Errors
    /// Returns [`SnapError::NotInitialized`] if the state directory is missing,
    /// or a configuration error if `config.toml` is unreadable or invalid.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(STATE_DIR).is_dir() {
            return Err(SnapError::NotInitialized(root));
        }

        let config = config::Config::load(&root.join(STATE_DIR).join(CONFIG_FILE))?;
        tracing::debug!(root = %root.display(), "opened working directory");
        Ok(Self { root, config })
    }

    /// Whether the state directory exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state_dir().is_dir()
    }

    /// The `.subsys` state directory.
    #[must_use]
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// The tracker file.
    #[must_use]
    pub fn tracker_path(&self) -> PathBuf {
        tracker_path(&self.root)
    }

    /// The snapshots directory.
    #[must_use]
    pub fn snapshots_dir(&self) -> PathBuf {
        snapshots_dir(&self.root)
    }

    /// The configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.state_dir().join(CONFIG_FILE)
    }

    /// The ignore file named by the configuration.
    #[must_use]
    pub fn ignore_path(&self) -> PathBuf {
        self.root.join(&self.config.tracking.ignore_file)
    }

    /// Loads the ignore list named by the configuration.
    ///
    /// # Errors
    /// Returns [`SnapError::IgnoreFile`] if the file is missing or unreadable.
    pub fn load_ignore(&self) -> Result<tracking::IgnoreList> {
        tracking::IgnoreList::load(&self.ignore_path())
    }

    /// Diff options derived from the configuration.
    #[must_use]
    pub fn diff_options(&self) -> tracking::DiffOptions {
        tracking::DiffOptions::from(&self.config)
    }

    /// Snapshot manager for this directory.
    #[must_use]
    pub fn snapshot_manager(&self) -> storage::SnapshotManager {
        storage::SnapshotManager::new(self.snapshots_dir(), self.config.core.compression_level)
    }
}
