//! Change tracking for a working directory.
//!
//! The tracking layer decides which files are eligible, what changed since
//! the last recorded state, and how each change is classified.
//!
//! # Architecture
//!
//! - [`ignore`] - substring ignore list loaded from the ignore file
//! - [`scanner`] - the shared eligible-file walk ([`EligibleFiles`])
//! - [`diff`] - compares the tree against the persisted [`crate::storage::Tracker`]
//!
//! # Usage
//!
//! ```no_run
//! use subsys::tracking::{DiffOptions, IgnoreList, diff};
//! use std::path::Path;
//!
//! # fn main() -> subsys::Result<()> {
//! let root = Path::new("/home/user/project");
//! let ignore = IgnoreList::load(&root.join("subsysignore"))?;
//!
//! let outcome = diff::diff(root, &ignore, &DiffOptions::default())?;
//! for change in outcome.changes.sorted() {
//!     println!("{} {}", change.status.status_char(), change.path);
//! }
//! # Ok(())
//! # }
//! ```

/// Change detection against the tracker
pub mod diff;
/// Substring ignore list
pub mod ignore;
/// Eligible-file walk
pub mod scanner;

pub use diff::{DiffOptions, DiffOutcome, detect};
pub use ignore::IgnoreList;
pub use scanner::{EligibleFiles, EligiblePath, scan};

use std::fmt;

/// Classification of a single change relative to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeStatus {
    /// Present on disk, absent from the tracker
    Added,
    /// Present in both with a different digest
    Modified,
    /// Present in the tracker, no longer a regular file on disk
    Deleted,
}

impl ChangeStatus {
    /// Returns a single-character representation of the status.
    #[must_use]
    pub const fn status_char(self) -> char {
        match self {
            Self::Added => 'A',
            Self::Modified => 'M',
            Self::Deleted => 'D',
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Modified => "Modified",
            Self::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One classified change, produced per diff and never persisted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileChange {
    /// Slash-normalized path relative to the root
    pub path: String,
    /// How the path changed
    pub status: ChangeStatus,
}

impl FileChange {
    /// Create a change for `path`
    pub fn new(path: impl Into<String>, status: ChangeStatus) -> Self {
        Self {
            path: path.into(),
            status,
        }
    }
}

/// The classified difference between the tree and the tracker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(Vec<FileChange>);

impl ChangeSet {
    /// An empty change set
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a change
    pub fn push(&mut self, change: FileChange) {
        self.0.push(change);
    }

    /// True when nothing changed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of changes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in detection order
    pub fn iter(&self) -> std::slice::Iter<'_, FileChange> {
        self.0.iter()
    }

    /// Number of changes with the given status
    #[must_use]
    pub fn count(&self, status: ChangeStatus) -> usize {
        self.0.iter().filter(|c| c.status == status).count()
    }

    /// Number of `Added` changes
    #[must_use]
    pub fn added(&self) -> usize {
        self.count(ChangeStatus::Added)
    }

    /// Number of `Modified` changes
    #[must_use]
    pub fn modified(&self) -> usize {
        self.count(ChangeStatus::Modified)
    }

    /// Number of `Deleted` changes
    #[must_use]
    pub fn deleted(&self) -> usize {
        self.count(ChangeStatus::Deleted)
    }

    /// Changes grouped Added, Modified, Deleted and sorted by path within each group
    #[must_use]
    pub fn sorted(&self) -> Vec<&FileChange> {
        let mut changes: Vec<&FileChange> = self.0.iter().collect();
        changes.sort_by(|a, b| a.status.cmp(&b.status).then_with(|| a.path.cmp(&b.path)));
        changes
    }
}

impl From<Vec<FileChange>> for ChangeSet {
    fn from(changes: Vec<FileChange>) -> Self {
        Self(changes)
    }
}

impl FromIterator<FileChange> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = FileChange>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ChangeSet {
    type Item = FileChange;
    type IntoIter = std::vec::IntoIter<FileChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a FileChange;
    type IntoIter = std::slice::Iter<'a, FileChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
