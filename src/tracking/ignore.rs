//! Ignore list loading and matching.
//!
//! Patterns are matched as plain substrings of the slash-normalized
//! relative path, so `build` excludes `build/out.o` and also `rebuild.sh`.
//! There is no glob syntax.

use crate::error::{Result, SnapError};
use std::path::Path;

/// Prefix marking a comment line in the ignore file
const COMMENT_PREFIX: char = '#';

/// Ordered, immutable set of substring patterns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    patterns: Vec<String>,
}

impl IgnoreList {
    /// An ignore list that excludes nothing
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Builds a list from patterns, dropping empty ones.
    ///
    /// An empty pattern is a substring of every path and would exclude the
    /// whole tree, so it never survives construction.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Load patterns from an ignore file, one per line.
    ///
    /// Blank lines and `#` comments are skipped and trailing whitespace
    /// (including `\r`) is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::IgnoreFile`] if the file is missing or unreadable.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SnapError::IgnoreFile {
            path: path.to_path_buf(),
            source,
        })?;

        let list = Self::parse(&content);
        tracing::debug!(
            path = %path.display(),
            patterns = list.len(),
            "loaded ignore list"
        );
        Ok(list)
    }

    /// Parse ignore file content
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self::new(
            content
                .lines()
                .map(str::trim_end)
                .filter(|line| !line.trim_start().starts_with(COMMENT_PREFIX)),
        )
    }

    /// True if `path` contains any pattern as a substring
    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| path.contains(pattern.as_str()))
    }

    /// Patterns in file order
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Number of patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the list has no patterns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Free-function form of [`IgnoreList::is_ignored`]
#[must_use]
pub fn is_ignored(path: &str, ignore: &IgnoreList) -> bool {
    ignore.is_ignored(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_substring_match() {
        let ignore = IgnoreList::new([".git", "node_modules"]);

        assert!(ignore.is_ignored(".git/config"));
        assert!(ignore.is_ignored("web/node_modules/react/index.js"));
        assert!(ignore.is_ignored("docs/.gitignore"));
        assert!(!ignore.is_ignored("src/main.rs"));
    }

    #[test]
    fn test_single_letter_pattern_is_permissive() {
        // Substring semantics: a bare letter matches anywhere in the path
        let ignore = IgnoreList::new(["a"]);
        assert!(ignore.is_ignored("data/file.txt"));
        assert!(!ignore.is_ignored("src/lib.rs"));
    }

    #[test]
    fn test_empty_patterns_dropped() {
        let ignore = IgnoreList::new(["", "target", ""]);
        assert_eq!(ignore.patterns(), &["target".to_string()]);
        assert!(!ignore.is_ignored("src/lib.rs"));
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let content = "# files to ignore\n.git\n\n  \nsubsysignore\r\n# another\n";
        let ignore = IgnoreList::parse(content);
        assert_eq!(
            ignore.patterns(),
            &[".git".to_string(), "subsysignore".to_string()]
        );
    }

    #[test]
    fn test_empty_list_ignores_nothing() {
        let ignore = IgnoreList::empty();
        assert!(ignore.is_empty());
        assert!(!is_ignored("anything/at/all", &ignore));
    }

    #[test]
    fn test_load_from_file() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("subsysignore");
        std::fs::write(&path, "# comment\n.git\ntarget\n")?;

        let ignore = IgnoreList::load(&path)?;
        assert_eq!(ignore.len(), 2);
        assert!(ignore.is_ignored("target/debug/app"));
        Ok(())
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let err = IgnoreList::load(&dir.path().join("subsysignore")).unwrap_err();
        assert!(matches!(err, SnapError::IgnoreFile { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
