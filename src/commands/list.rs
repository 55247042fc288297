use crate::SnapContext;
use crate::output;
use crate::utils::format_size;
use anyhow::{Context, Result};
use colored::Colorize;

/// List archived snapshots, newest first
///
/// # Errors
///
/// Returns an error if the snapshots directory cannot be read
pub fn execute(ctx: &SnapContext) -> Result<()> {
    let snapshots = ctx
        .snapshot_manager()
        .list()
        .context("Failed to list snapshots")?;

    if snapshots.is_empty() {
        output::info("No snapshots yet");
        return Ok(());
    }

    for snapshot in &snapshots {
        println!(
            "{}  {:>10}  {}",
            snapshot.modified.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            format_size(snapshot.size),
            snapshot.name.bold()
        );
    }
    Ok(())
}
