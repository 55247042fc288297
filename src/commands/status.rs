use crate::SnapContext;
use crate::output;
use crate::tracking::detect;
use anyhow::{Context, Result};

/// Show changes since the last snapshot without writing anything
///
/// # Errors
///
/// Returns an error if:
/// - The ignore file cannot be read
/// - The tracker is malformed
/// - Walking or hashing the working tree fails
pub fn execute(ctx: &SnapContext, short: bool) -> Result<()> {
    let ignore = ctx.load_ignore()?;
    let outcome = detect(&ctx.root, &ignore, &ctx.diff_options())
        .with_context(|| format!("Failed to detect changes in {}", ctx.root.display()))?;

    if outcome.changes.is_empty() {
        output::info("Nothing changed since the last snapshot");
        return Ok(());
    }

    if outcome.first_snapshot {
        output::info("No snapshot recorded yet");
    }
    output::print_changes(&outcome.changes, short);
    output::verbose(&output::summarize(&outcome.changes));
    Ok(())
}
