use crate::error::{Result, SnapError};
use crate::tracking::{EligibleFiles, IgnoreList};
use chrono::{DateTime, Datelike, Local, Timelike};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Characters that make a name unsafe as a file name or URL segment
const DISALLOWED: &[char] = &[
    '&', '$', '+', ',', ':', ';', '=', '?', '@', '#', '<', '>', '[', ']', '{', '}', '/', '\\',
    '^', '%',
];

/// Default deflate level for archives
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Highest deflate level accepted
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Entries at or above this size need zip64 headers
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;

/// True if `name` is non-empty and free of whitespace and reserved characters.
#[must_use]
pub fn validate_name(name: &str) -> bool {
    rejection_reason(name).is_none()
}

fn rejection_reason(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("name is empty".to_string());
    }
    if let Some(c) = name.chars().find(|c| c.is_whitespace()) {
        return Some(format!("contains whitespace {c:?}"));
    }
    name.chars()
        .find(|c| DISALLOWED.contains(c))
        .map(|c| format!("contains reserved character '{c}'"))
}

/// A snapshot name that passed validation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotName(String);

impl SnapshotName {
    /// Validate and wrap a snapshot name.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::InvalidName`] with the first reason the name was rejected.
    pub fn parse(name: &str) -> Result<Self> {
        match rejection_reason(name) {
            Some(reason) => Err(SnapError::InvalidName {
                name: name.to_string(),
                reason,
            }),
            None => Ok(Self(name.to_string())),
        }
    }

    /// The validated name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Archive file name, `<name>.zip`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, crate::ARCHIVE_EXTENSION)
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A packaged archive found in the snapshots directory
#[derive(Debug, Clone)]
pub struct SnapshotInfo {
    /// Name without extension
    pub name: String,
    /// Absolute path to the archive
    pub path: PathBuf,
    /// Archive size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Local>,
}

/// Packages working trees into zip archives under one snapshots directory
pub struct SnapshotManager {
    snapshots_dir: PathBuf,
    compression_level: u32,
}

impl SnapshotManager {
    /// Create a manager writing into `snapshots_dir`; the level is clamped to 0..=9
    #[must_use]
    pub fn new(snapshots_dir: PathBuf, compression_level: u32) -> Self {
        Self {
            snapshots_dir,
            compression_level: compression_level.min(MAX_COMPRESSION_LEVEL),
        }
    }

    /// Final location of the archive for `name`
    #[must_use]
    pub fn path_for(&self, name: &SnapshotName) -> PathBuf {
        self.snapshots_dir.join(name.file_name())
    }

    /// Whether an archive with this name already exists
    #[must_use]
    pub fn exists(&self, name: &SnapshotName) -> bool {
        self.path_for(name).exists()
    }

    /// Package every eligible file under `root` into `<name>.zip`.
    ///
    /// Entries are stored under their root-relative path with deflate
    /// compression, in walk order, and directories get no entries of their
    /// own. The archive is built in a temporary file next to its final
    /// location and only renamed into place once packaging succeeded; on any
    /// failure the temporary file is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the walk fails, a file cannot be read, or the
    /// archive cannot be written or moved into place.
    pub fn archive(
        &self,
        root: &Path,
        name: &SnapshotName,
        files: &EligibleFiles<'_>,
    ) -> Result<PathBuf> {
        let _span = tracing::info_span!("archive", name = %name).entered();
        let final_path = self.path_for(name);

        fs::create_dir_all(&self.snapshots_dir)
            .map_err(|e| SnapError::io(&self.snapshots_dir, e))?;

        let temp = tempfile::Builder::new()
            .prefix(".pending-")
            .suffix(&format!(".{}", crate::ARCHIVE_EXTENSION))
            .tempfile_in(&self.snapshots_dir)
            .map_err(|e| SnapError::io(&self.snapshots_dir, e))?;

        let mut zip = ZipWriter::new(temp);
        let mut entries = 0usize;

        for entry in files.iter() {
            let entry = entry?;
            let file = File::open(&entry.absolute).map_err(|e| SnapError::io(&entry.absolute, e))?;
            let metadata = file
                .metadata()
                .map_err(|e| SnapError::io(&entry.absolute, e))?;

            zip.start_file(entry.relative.as_str(), self.entry_options(&metadata))?;
            io::copy(&mut BufReader::new(file), &mut zip)
                .map_err(|e| SnapError::io(&entry.absolute, e))?;
            entries += 1;
        }

        let temp = zip.finish()?;
        temp.as_file()
            .sync_all()
            .map_err(|e| SnapError::io(temp.path(), e))?;
        temp.persist(&final_path)
            .map_err(|e| SnapError::io(&final_path, e.error))?;

        tracing::info!(
            root = %root.display(),
            archive = %final_path.display(),
            entries,
            "snapshot archived"
        );
        Ok(final_path)
    }

    fn entry_options(&self, metadata: &fs::Metadata) -> SimpleFileOptions {
        let mut options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(self.compression_level)))
            .large_file(metadata.len() >= ZIP64_THRESHOLD);

        if let Some(timestamp) = metadata.modified().ok().and_then(zip_timestamp) {
            options = options.last_modified_time(timestamp);
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(metadata.permissions().mode() & 0o7777);
        }
        options
    }

    /// List archives in the snapshots directory, newest first.
    ///
    /// Pending temporary archives are skipped. A missing directory lists as empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or an entry's metadata cannot be read.
    pub fn list(&self) -> Result<Vec<SnapshotInfo>> {
        let read_dir = match fs::read_dir(&self.snapshots_dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SnapError::io(&self.snapshots_dir, e)),
        };

        let mut snapshots = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| SnapError::io(&self.snapshots_dir, e))?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some(crate::ARCHIVE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with(".pending-") {
                continue;
            }

            let metadata = entry.metadata().map_err(|e| SnapError::io(&path, e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified().map_err(|e| SnapError::io(&path, e))?;

            snapshots.push(SnapshotInfo {
                name: name.to_string(),
                size: metadata.len(),
                modified: DateTime::<Local>::from(modified),
                path,
            });
        }

        snapshots.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(snapshots)
    }
}

/// Local-time zip timestamp, `None` outside the 1980..=2107 range zip can hold
fn zip_timestamp(modified: SystemTime) -> Option<zip::DateTime> {
    let local = DateTime::<Local>::from(modified);
    zip::DateTime::from_date_and_time(
        u16::try_from(local.year()).ok()?,
        u8::try_from(local.month()).ok()?,
        u8::try_from(local.day()).ok()?,
        u8::try_from(local.hour()).ok()?,
        u8::try_from(local.minute()).ok()?,
        u8::try_from(local.second()).ok()?,
    )
    .ok()
}

/// Package the eligible files under `root` into `<root>/.subsys/snapshots/<name>.zip`
///
/// # Errors
///
/// Returns an error if packaging fails; see [`SnapshotManager::archive`].
pub fn archive(root: &Path, name: &SnapshotName, ignore: &IgnoreList) -> Result<PathBuf> {
    SnapshotManager::new(crate::snapshots_dir(root), DEFAULT_COMPRESSION_LEVEL).archive(
        root,
        name,
        &EligibleFiles::new(root, ignore),
    )
}
