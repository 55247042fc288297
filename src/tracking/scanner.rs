//! Directory scanner for discovering eligible files in a working tree.
//!
//! [`EligibleFiles`] is the single walk shared by the scanner, the diff
//! engine and the archiver. It walks depth-first with entries sorted by file
//! name, prunes ignored directories instead of descending into them, never
//! enters the `.subsys` state directory, and yields regular files only.

use super::{ChangeStatus, FileChange};
use crate::STATE_DIR;
use crate::error::Result;
use crate::tracking::ignore::IgnoreList;
use crate::utils::paths::to_slash_relative;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file that passed the ignore filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligiblePath {
    /// Slash-normalized path relative to the walk root
    pub relative: String,
    /// Absolute path on disk
    pub absolute: PathBuf,
}

/// Restartable description of the eligible files under a root
#[derive(Debug, Clone)]
pub struct EligibleFiles<'a> {
    /// Root of the working tree
    root: &'a Path,
    /// Patterns to exclude
    ignore: &'a IgnoreList,
    /// Whether to follow symbolic links
    follow_symlinks: bool,
}

impl<'a> EligibleFiles<'a> {
    /// Describe the eligible files under `root`
    #[must_use]
    pub const fn new(root: &'a Path, ignore: &'a IgnoreList) -> Self {
        Self {
            root,
            ignore,
            follow_symlinks: false,
        }
    }

    /// Follow symbolic links while walking (off by default)
    #[must_use]
    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Start a fresh lazy walk.
    ///
    /// Each call re-reads the filesystem, so two iterators over the same
    /// `EligibleFiles` observe the tree as it is when they are consumed.
    pub fn iter(&self) -> impl Iterator<Item = Result<EligiblePath>> + use<'a> {
        let root = self.root;
        let ignore = self.ignore;

        WalkDir::new(root)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry.depth() == 0 || !is_excluded(entry.path(), root, ignore))
            .filter_map(move |entry| match entry {
                Ok(entry) => match to_slash_relative(entry.path(), root) {
                    Ok(Some(relative)) if entry.file_type().is_file() => Some(Ok(EligiblePath {
                        relative,
                        absolute: entry.into_path(),
                    })),
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                },
                Err(e) => Some(Err(e.into())),
            })
    }

    /// Walk the whole tree, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first walk error; no partial results are returned.
    pub fn collect(&self) -> Result<Vec<EligiblePath>> {
        self.iter().collect()
    }
}

/// Whether a walk entry must be skipped (and, for directories, pruned)
///
/// Non-UTF-8 paths are kept so the walk reports them as errors.
fn is_excluded(path: &Path, root: &Path, ignore: &IgnoreList) -> bool {
    match to_slash_relative(path, root) {
        Ok(Some(relative)) => is_state_path(&relative) || ignore.is_ignored(&relative),
        Ok(None) => true,
        Err(_) => false,
    }
}

/// True for paths inside the engine's own state directory
#[must_use]
pub fn is_state_path(relative: &str) -> bool {
    relative.split('/').next() == Some(STATE_DIR)
}

/// List every eligible file under `root` as an `Added` change.
///
/// # Errors
///
/// Returns an error as soon as the walk fails.
pub fn scan(root: &Path, ignore: &IgnoreList) -> Result<Vec<FileChange>> {
    let _span = tracing::debug_span!("scan", root = %root.display()).entered();

    let changes: Vec<FileChange> = EligibleFiles::new(root, ignore)
        .iter()
        .map(|entry| entry.map(|e| FileChange::new(e.relative, ChangeStatus::Added)))
        .collect::<Result<_>>()?;

    tracing::debug!(files = changes.len(), "scan complete");
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapError;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_structure(root: &Path) -> anyhow::Result<()> {
        // root/
        //   b.txt
        //   a.txt
        //   src/
        //     lib.rs
        //     nested/
        //       deep.rs
        //   target/
        //     out.o
        //   .subsys/
        //     .track
        fs::create_dir_all(root.join("src/nested"))?;
        fs::create_dir_all(root.join("target"))?;
        fs::create_dir_all(root.join(".subsys"))?;

        fs::write(root.join("b.txt"), "b")?;
        fs::write(root.join("a.txt"), "a")?;
        fs::write(root.join("src/lib.rs"), "// lib")?;
        fs::write(root.join("src/nested/deep.rs"), "// deep")?;
        fs::write(root.join("target/out.o"), [0u8, 1, 2])?;
        fs::write(root.join(".subsys/.track"), "")?;
        Ok(())
    }

    fn relative_paths(changes: &[FileChange]) -> Vec<&str> {
        changes.iter().map(|c| c.path.as_str()).collect()
    }

    #[test]
    fn test_scan_lexical_depth_first() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        create_test_structure(temp.path())?;

        let changes = scan(temp.path(), &IgnoreList::empty())?;

        assert_eq!(
            relative_paths(&changes),
            vec![
                "a.txt",
                "b.txt",
                "src/lib.rs",
                "src/nested/deep.rs",
                "target/out.o"
            ]
        );
        assert!(changes.iter().all(|c| c.status == ChangeStatus::Added));
        Ok(())
    }

    #[test]
    fn test_scan_prunes_ignored_directories() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        create_test_structure(temp.path())?;

        let ignore = IgnoreList::new(["target", "nested"]);
        let changes = scan(temp.path(), &ignore)?;

        assert_eq!(relative_paths(&changes), vec!["a.txt", "b.txt", "src/lib.rs"]);
        Ok(())
    }

    #[test]
    fn test_state_directory_never_scanned() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        create_test_structure(temp.path())?;

        let changes = scan(temp.path(), &IgnoreList::empty())?;
        assert!(!changes.iter().any(|c| c.path.starts_with(".subsys")));
        Ok(())
    }

    #[test]
    fn test_directories_not_emitted() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        fs::create_dir_all(temp.path().join("empty/inner"))?;

        let changes = scan(temp.path(), &IgnoreList::empty())?;
        assert!(changes.is_empty());
        Ok(())
    }

    #[test]
    fn test_iter_is_restartable() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        create_test_structure(temp.path())?;

        let ignore = IgnoreList::empty();
        let files = EligibleFiles::new(temp.path(), &ignore);
        let first = files.collect()?;

        fs::write(temp.path().join("c.txt"), "c")?;
        let second = files.collect()?;

        assert_eq!(second.len(), first.len() + 1);
        assert!(second.iter().any(|e| e.relative == "c.txt"));
        Ok(())
    }

    #[test]
    fn test_absolute_paths_resolve() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        create_test_structure(temp.path())?;

        let ignore = IgnoreList::empty();
        for entry in EligibleFiles::new(temp.path(), &ignore).iter() {
            let entry = entry?;
            assert!(entry.absolute.is_file());
            assert!(entry.absolute.starts_with(temp.path()));
        }
        Ok(())
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let result = scan(&temp.path().join("does-not-exist"), &IgnoreList::empty());
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_error_midway_returns_no_partial_result() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        create_test_structure(temp.path())?;
        std::os::unix::fs::symlink(temp.path().join("missing"), temp.path().join("src/broken"))?;

        let ignore = IgnoreList::empty();
        let files = EligibleFiles::new(temp.path(), &ignore).follow_symlinks(true);

        let yielded: Vec<_> = files.iter().collect();
        assert!(yielded.iter().any(|r| r.is_ok()));
        assert!(yielded.iter().any(|r| r.is_err()));

        let err = files.collect().unwrap_err();
        assert!(matches!(err, SnapError::Walk(_)));

        // Without following links the dangling entry is just not a regular file
        assert_eq!(scan(temp.path(), &ignore)?.len(), 5);
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_file_name_fails_scan() -> anyhow::Result<()> {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new()?;
        fs::write(temp.path().join("ok.txt"), "ok")?;
        fs::write(temp.path().join(OsStr::from_bytes(b"bad\xff.txt")), "a")?;
        fs::write(temp.path().join(OsStr::from_bytes(b"bad\xfe.txt")), "b")?;

        let err = scan(temp.path(), &IgnoreList::empty()).unwrap_err();
        assert!(matches!(err, SnapError::NonUtf8Path(_)));
        Ok(())
    }

    #[test]
    fn test_is_state_path() {
        assert!(is_state_path(".subsys"));
        assert!(is_state_path(".subsys/.track"));
        assert!(!is_state_path("docs/.subsys"));
        assert!(!is_state_path(".subsysignore"));
    }
}
