//! Change detection against the persisted tracker.
//!
//! Detection is split from persistence: [`detect`] computes the change set
//! and the tracker describing the current tree without touching disk, and
//! [`diff`] additionally persists that tracker when something changed. The
//! snapshot workflow uses `detect` so the tracker is only written after the
//! archive has been packaged.

use super::scanner::{EligibleFiles, is_state_path};
use super::{ChangeSet, ChangeStatus, FileChange, IgnoreList};
use crate::config::Config;
use crate::error::Result;
use crate::storage::Tracker;
use crate::utils::hash::{Digest, checksum_many};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Files hashed in parallel once a scan reaches this many entries
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// Knobs for a single detection pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Hash on the thread pool when at least this many files are eligible
    pub parallel_threshold: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl From<&Config> for DiffOptions {
    fn from(config: &Config) -> Self {
        Self {
            follow_symlinks: config.tracking.follow_symlinks,
            parallel_threshold: config.performance.parallel_threshold,
        }
    }
}

/// Result of comparing the tree with the last tracked state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Classified changes
    pub changes: ChangeSet,
    /// Tracker describing the current tree (deleted files dropped)
    pub tracker: Tracker,
    /// True when no tracker existed before this pass
    pub first_snapshot: bool,
}

impl DiffOutcome {
    /// Whether this outcome must be persisted
    #[must_use]
    pub fn needs_save(&self) -> bool {
        self.first_snapshot || !self.changes.is_empty()
    }
}

/// Compare the tree under `root` with the persisted tracker without writing.
///
/// Tracked paths are checked first: a path that is no longer an eligible
/// regular file is `Deleted` (a file replaced by a directory counts), a path
/// whose digest differs is `Modified`. Eligible files the tracker has never
/// seen are then reported as `Added` in walk order. Tracked paths that the
/// ignore list now excludes are dropped silently.
///
/// # Errors
///
/// Returns an error if the tracker cannot be loaded, the walk fails, or a
/// file cannot be hashed.
pub fn detect(root: &Path, ignore: &IgnoreList, options: &DiffOptions) -> Result<DiffOutcome> {
    let _span = tracing::debug_span!("detect", root = %root.display()).entered();

    let previous = Tracker::load(root)?;
    let eligible = EligibleFiles::new(root, ignore)
        .follow_symlinks(options.follow_symlinks)
        .collect()?;

    let absolute: Vec<PathBuf> = eligible.iter().map(|e| e.absolute.clone()).collect();
    let parallel = absolute.len() >= options.parallel_threshold;
    tracing::debug!(files = absolute.len(), parallel, "hashing eligible files");
    let digests = checksum_many(&absolute, parallel)?;

    let current: Vec<(&str, Digest)> = eligible
        .iter()
        .map(|e| e.relative.as_str())
        .zip(digests)
        .collect();

    let outcome = match previous {
        None => first_pass(&current),
        Some(previous) => compare(&previous, &current, ignore),
    };

    tracing::debug!(
        added = outcome.changes.added(),
        modified = outcome.changes.modified(),
        deleted = outcome.changes.deleted(),
        first_snapshot = outcome.first_snapshot,
        "detection complete"
    );
    Ok(outcome)
}

/// Detect changes and persist the new tracker if anything changed.
///
/// On the first pass the tracker is always written, even for an empty tree.
/// An empty change set on later passes leaves the persisted tracker as is.
///
/// # Errors
///
/// Returns an error if detection fails or the tracker cannot be saved.
pub fn diff(root: &Path, ignore: &IgnoreList, options: &DiffOptions) -> Result<DiffOutcome> {
    let outcome = detect(root, ignore, options)?;
    if outcome.needs_save() {
        outcome.tracker.save(root)?;
    }
    Ok(outcome)
}

fn first_pass(current: &[(&str, Digest)]) -> DiffOutcome {
    let mut tracker = Tracker::new();
    let changes = current
        .iter()
        .map(|&(path, digest)| {
            tracker.insert(path, digest);
            FileChange::new(path, ChangeStatus::Added)
        })
        .collect();

    DiffOutcome {
        changes,
        tracker,
        first_snapshot: true,
    }
}

fn compare(previous: &Tracker, current: &[(&str, Digest)], ignore: &IgnoreList) -> DiffOutcome {
    let on_disk: HashMap<&str, &Digest> = current.iter().map(|(p, d)| (*p, d)).collect();
    let mut changes = ChangeSet::new();

    for path in previous.paths() {
        if is_state_path(path) || ignore.is_ignored(path) {
            continue;
        }
        match (on_disk.get(path), previous.get(path)) {
            (None, _) => changes.push(FileChange::new(path, ChangeStatus::Deleted)),
            (Some(now), Some(then)) if *now != then => {
                changes.push(FileChange::new(path, ChangeStatus::Modified));
            }
            _ => {}
        }
    }

    for &(path, _) in current {
        if !previous.contains(path) {
            changes.push(FileChange::new(path, ChangeStatus::Added));
        }
    }

    let tracker = current
        .iter()
        .map(|&(path, digest)| crate::storage::FileRecord::new(path, digest))
        .collect();

    DiffOutcome {
        changes,
        tracker,
        first_snapshot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash::hash_bytes;
    use std::fs;
    use tempfile::TempDir;

    fn statuses(outcome: &DiffOutcome) -> Vec<(String, ChangeStatus)> {
        outcome
            .changes
            .sorted()
            .into_iter()
            .map(|c| (c.path.clone(), c.status))
            .collect()
    }

    #[test]
    fn test_first_diff_adds_everything() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "X").unwrap();
        fs::write(dir.path().join("b.txt"), "Y").unwrap();

        let outcome = diff(dir.path(), &IgnoreList::empty(), &DiffOptions::default())?;

        assert!(outcome.first_snapshot);
        assert_eq!(outcome.changes.added(), 2);
        assert_eq!(outcome.tracker.len(), 2);
        assert_eq!(Tracker::load(dir.path())?, Some(outcome.tracker));
        Ok(())
    }

    #[test]
    fn test_detect_does_not_write() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "X").unwrap();

        let outcome = detect(dir.path(), &IgnoreList::empty(), &DiffOptions::default())?;

        assert_eq!(outcome.changes.len(), 1);
        assert!(Tracker::load(dir.path())?.is_none());
        Ok(())
    }

    #[test]
    fn test_second_diff_is_empty() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "X").unwrap();

        diff(dir.path(), &IgnoreList::empty(), &DiffOptions::default())?;
        let second = diff(dir.path(), &IgnoreList::empty(), &DiffOptions::default())?;

        assert!(second.changes.is_empty());
        assert!(!second.first_snapshot);
        assert!(!second.needs_save());
        Ok(())
    }

    #[test]
    fn test_modified_deleted_added() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("a.txt"), "X").unwrap();
        fs::write(root.join("b.txt"), "Y").unwrap();
        diff(root, &IgnoreList::empty(), &DiffOptions::default())?;

        fs::write(root.join("a.txt"), "Z").unwrap();
        fs::remove_file(root.join("b.txt")).unwrap();
        fs::write(root.join("c.txt"), "W").unwrap();

        let outcome = diff(root, &IgnoreList::empty(), &DiffOptions::default())?;

        assert_eq!(
            statuses(&outcome),
            vec![
                ("c.txt".to_string(), ChangeStatus::Added),
                ("a.txt".to_string(), ChangeStatus::Modified),
                ("b.txt".to_string(), ChangeStatus::Deleted),
            ]
        );
        assert_eq!(outcome.tracker.get("a.txt"), Some(&hash_bytes(b"Z")));
        assert_eq!(outcome.tracker.get("c.txt"), Some(&hash_bytes(b"W")));
        assert!(!outcome.tracker.contains("b.txt"));
        Ok(())
    }

    #[test]
    fn test_file_replaced_by_directory_is_deleted() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("thing"), "file").unwrap();
        diff(root, &IgnoreList::empty(), &DiffOptions::default())?;

        fs::remove_file(root.join("thing")).unwrap();
        fs::create_dir(root.join("thing")).unwrap();

        let outcome = diff(root, &IgnoreList::empty(), &DiffOptions::default())?;
        assert_eq!(
            statuses(&outcome),
            vec![("thing".to_string(), ChangeStatus::Deleted)]
        );
        Ok(())
    }

    #[test]
    fn test_newly_ignored_path_dropped_silently() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("keep.txt"), "k").unwrap();
        fs::write(root.join("secret.log"), "s").unwrap();
        diff(root, &IgnoreList::empty(), &DiffOptions::default())?;

        fs::write(root.join("secret.log"), "changed").unwrap();
        let ignore = IgnoreList::new([".log"]);
        let outcome = detect(root, &ignore, &DiffOptions::default())?;

        assert!(outcome.changes.is_empty());
        assert!(!outcome.tracker.contains("secret.log"));
        Ok(())
    }

    #[test]
    fn test_parallel_matches_sequential() -> Result<()> {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("f{i:02}.txt")), format!("{i}")).unwrap();
        }

        let sequential = DiffOptions {
            parallel_threshold: usize::MAX,
            ..DiffOptions::default()
        };
        let parallel = DiffOptions {
            parallel_threshold: 1,
            ..DiffOptions::default()
        };

        let a = detect(dir.path(), &IgnoreList::empty(), &sequential)?;
        let b = detect(dir.path(), &IgnoreList::empty(), &parallel)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_empty_tree_first_pass_persists_empty_tracker() -> Result<()> {
        let dir = TempDir::new().unwrap();

        let outcome = diff(dir.path(), &IgnoreList::empty(), &DiffOptions::default())?;

        assert!(outcome.changes.is_empty());
        assert_eq!(Tracker::load(dir.path())?, Some(Tracker::new()));
        Ok(())
    }
}
