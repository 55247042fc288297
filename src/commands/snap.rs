use crate::error::SnapError;
use crate::output;
use crate::{SnapContext, snapshot};
use anyhow::Result;

/// Create a named snapshot and print what changed
///
/// An empty change set is not a failure: it is reported and the command
/// succeeds without writing an archive.
///
/// # Errors
///
/// Returns an error if:
/// - The name is invalid or already taken
/// - The ignore file cannot be read
/// - Hashing, packaging or saving the tracker fails
pub fn execute(ctx: &SnapContext, name: &str, short: bool) -> Result<()> {
    let report = match snapshot::create(ctx, name) {
        Ok(report) => report,
        Err(SnapError::NoChanges) => {
            output::info("Nothing to snapshot: no changes since the last snapshot");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    output::print_changes(&report.changes, short);
    output::success(&format!(
        "Snapshot '{}' created ({})",
        report.name,
        output::summarize(&report.changes)
    ));
    output::action("Archive", &report.archive.display().to_string());
    Ok(())
}
