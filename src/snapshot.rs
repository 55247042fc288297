//! The snapshot workflow.
//!
//! Steps run in a fixed order and each one must succeed before the next
//! starts: validate the name, refuse to overwrite an existing archive, load
//! the ignore list, detect changes, package the archive, and only then
//! persist the tracker. A failure at any step leaves the previous tracker in
//! place.

use crate::SnapContext;
use crate::error::{Result, SnapError};
use crate::storage::SnapshotName;
use crate::tracking::{ChangeSet, EligibleFiles, detect};
use std::path::PathBuf;

/// What a successful snapshot produced
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    /// The validated snapshot name
    pub name: SnapshotName,
    /// Final path of the archive
    pub archive: PathBuf,
    /// Changes since the previous snapshot
    pub changes: ChangeSet,
}

/// Create a named snapshot of the working directory.
///
/// # Errors
///
/// - [`SnapError::InvalidName`] or [`SnapError::SnapshotExists`] before any side effect
/// - [`SnapError::IgnoreFile`] when the ignore file cannot be read
/// - [`SnapError::NoChanges`] when nothing changed since the last snapshot
/// - an I/O class error if hashing, packaging or saving the tracker fails
pub fn create(ctx: &SnapContext, name: &str) -> Result<SnapshotReport> {
    let name = SnapshotName::parse(name)?;
    let manager = ctx.snapshot_manager();
    if manager.exists(&name) {
        return Err(SnapError::SnapshotExists(name.to_string()));
    }

    let ignore = ctx.load_ignore()?;
    let options = ctx.diff_options();
    let outcome = detect(&ctx.root, &ignore, &options)?;
    if outcome.changes.is_empty() {
        tracing::info!(name = %name, "no changes, snapshot skipped");
        return Err(SnapError::NoChanges);
    }

    let files = EligibleFiles::new(&ctx.root, &ignore).follow_symlinks(options.follow_symlinks);
    let archive = manager.archive(&ctx.root, &name, &files)?;
    outcome.tracker.save(&ctx.root)?;

    Ok(SnapshotReport {
        name,
        archive,
        changes: outcome.changes,
    })
}
