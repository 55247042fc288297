use super::FileRecord;
use crate::error::{Result, SnapError};
use crate::utils::hash::Digest;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Separator between the path and the digest on a tracker line
const FIELD_SEPARATOR: char = ' ';

/// Mapping of relative path to last-known content digest.
///
/// Lookups are keyed by exact path. The on-disk form is one
/// `"<path> <hex-digest>"` line per record, LF-joined, written in path order so
/// the persisted file is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tracker {
    records: HashMap<String, Digest>,
}

impl Tracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the tracker persisted under `root`.
    ///
    /// `Ok(None)` means no tracker file exists yet, i.e. the next diff is the
    /// first snapshot. An existing but empty file loads as an empty tracker.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains a malformed line.
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let path = crate::tracker_path(root);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no tracker found");
                return Ok(None);
            }
            Err(e) => return Err(SnapError::io(&path, e)),
        };

        let tracker = Self::deserialize(&content)?;
        tracing::debug!(path = %path.display(), records = tracker.len(), "loaded tracker");
        Ok(Some(tracker))
    }

    /// Persist the tracker under `root`, replacing any previous state.
    ///
    /// The content is written to a temporary file in the same directory and
    /// renamed over the tracker, so a crash mid-write leaves the old file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, root: &Path) -> Result<()> {
        let path = crate::tracker_path(root);
        let data = self.serialize()?;

        let parent = path
            .parent()
            .ok_or_else(|| SnapError::io(&path, std::io::Error::other("tracker has no parent")))?;
        std::fs::create_dir_all(parent).map_err(|e| SnapError::io(parent, e))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|e| SnapError::io(parent, e))?;
        temp.write_all(data.as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| SnapError::io(temp.path(), e))?;
        temp.persist(&path).map_err(|e| SnapError::io(&path, e.error))?;

        tracing::debug!(path = %path.display(), records = self.len(), "saved tracker");
        Ok(())
    }

    /// Render the persisted form.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::TrackerFormat`] for a path that cannot be
    /// represented on a single line.
    pub fn serialize(&self) -> Result<String> {
        let mut paths: Vec<&String> = self.records.keys().collect();
        paths.sort();

        let mut lines = Vec::with_capacity(paths.len());
        for (index, path) in paths.into_iter().enumerate() {
            if path.is_empty() || path.contains(['\n', '\r']) {
                return Err(SnapError::TrackerFormat {
                    line: index + 1,
                    reason: format!("path {path:?} cannot be stored on one line"),
                });
            }
            lines.push(format!("{path}{FIELD_SEPARATOR}{}", self.records[path]));
        }

        Ok(lines.join("\n"))
    }

    /// Parse the persisted form.
    ///
    /// The digest is the last space-separated field, so paths may contain
    /// spaces. Blank lines and a trailing `\r` are tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::TrackerFormat`] for a line without a separator,
    /// an invalid digest, or a duplicate path.
    pub fn deserialize(content: &str) -> Result<Self> {
        let mut records = HashMap::new();

        for (index, raw) in content.split('\n').enumerate() {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            if line.is_empty() {
                continue;
            }
            let line_no = index + 1;

            let (path, hex) =
                line.rsplit_once(FIELD_SEPARATOR)
                    .ok_or_else(|| SnapError::TrackerFormat {
                        line: line_no,
                        reason: "missing digest".to_string(),
                    })?;

            if path.is_empty() {
                return Err(SnapError::TrackerFormat {
                    line: line_no,
                    reason: "empty path".to_string(),
                });
            }

            let digest: Digest = hex.parse().map_err(|e| SnapError::TrackerFormat {
                line: line_no,
                reason: format!("{e}"),
            })?;

            if records.insert(path.to_string(), digest).is_some() {
                return Err(SnapError::TrackerFormat {
                    line: line_no,
                    reason: format!("duplicate path '{path}'"),
                });
            }
        }

        Ok(Self { records })
    }

    /// Recorded digest for an exact path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Digest> {
        self.records.get(path)
    }

    /// Record a digest, returning the previous one
    pub fn insert(&mut self, path: impl Into<String>, digest: Digest) -> Option<Digest> {
        self.records.insert(path.into(), digest)
    }

    /// Drop a path
    pub fn remove(&mut self, path: &str) -> Option<Digest> {
        self.records.remove(path)
    }

    /// Whether a path is tracked
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the tracker has no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tracked paths in sorted order
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.records.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// All records sorted by path
    #[must_use]
    pub fn records(&self) -> Vec<FileRecord> {
        let mut records: Vec<FileRecord> = self
            .records
            .iter()
            .map(|(path, digest)| FileRecord::new(path.clone(), *digest))
            .collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }
}

impl FromIterator<FileRecord> for Tracker {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.path, r.digest)).collect(),
        }
    }
}
