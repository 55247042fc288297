use crate::config::Config;
use crate::error::{Result as SnapResult, SnapError};
use crate::{CONFIG_FILE, DEFAULT_IGNORE_FILE, STATE_DIR, snapshots_dir};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

/// Ignore file written by `init` when none exists
pub const DEFAULT_IGNORE_CONTENT: &str =
    "# This file contains files to ignore in your snapshots\n.subsys\nsubsysignore\n.git\n";

/// Create the state layout under `root`.
///
/// Writes `.subsys/`, `.subsys/snapshots/` and a default `config.toml`. An
/// ignore file is written only if the root does not already have one. No
/// tracker is created, so the first diff reports every file as added.
///
/// # Errors
///
/// Returns [`SnapError::AlreadyInitialized`] if the state directory exists,
/// or an I/O error if any part of the layout cannot be written.
pub fn init_directory(root: &Path) -> SnapResult<()> {
    let state_dir = root.join(STATE_DIR);
    if state_dir.exists() {
        return Err(SnapError::AlreadyInitialized(root.to_path_buf()));
    }

    let snapshots = snapshots_dir(root);
    std::fs::create_dir_all(&snapshots).map_err(|e| SnapError::io(&snapshots, e))?;
    Config::default().save(&state_dir.join(CONFIG_FILE))?;

    let ignore_path = root.join(DEFAULT_IGNORE_FILE);
    if !ignore_path.exists() {
        std::fs::write(&ignore_path, DEFAULT_IGNORE_CONTENT)
            .map_err(|e| SnapError::io(&ignore_path, e))?;
    }

    tracing::info!(root = %root.display(), "initialized");
    Ok(())
}

/// Initialize snapshot tracking in `root`
///
/// # Errors
///
/// Returns an error if:
/// - The directory is already initialized
/// - Failed to create the state directory structure
/// - Failed to write the default configuration or ignore file
pub fn execute(root: &Path) -> Result<()> {
    init_directory(root)
        .with_context(|| format!("Failed to initialize {}", root.display()))?;

    crate::output::success(&format!(
        "Initialized subsys in {}",
        root.join(STATE_DIR).display()
    ));
    crate::output::info(&format!(
        "\n{}\n  subsys status              # Show changes\n  subsys snap --name first   # Create a snapshot",
        "Quick start:".bold()
    ));
    Ok(())
}
