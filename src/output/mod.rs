//! Console output for the subsys CLI.
//!
//! Status messages go to stderr with colors keyed to their severity and are
//! filtered by a global [`Verbosity`]. Change lists and listings are the
//! command's actual result and always go to stdout.

use crate::tracking::{ChangeSet, ChangeStatus};
use colored::{ColoredString, Colorize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

impl Verbosity {
    /// Pick a level from the `--quiet` and `--verbose` flags; quiet wins.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints a success message in green (respects quiet mode).
pub fn success(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.green());
}

/// Prints a warning message in bold yellow (always shown).
pub fn warning(message: &str) {
    eprintln!("{}", message.yellow().bold());
}

/// Prints an informational message in dimmed color (respects quiet mode).
pub fn info(message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints a verbose debug message (only in verbose mode).
pub fn verbose(message: &str) {
    if get_verbosity() != Verbosity::Verbose {
        return;
    }
    eprintln!("{}", message.dimmed());
}

/// Prints an action message with dimmed verb and normal message.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", verb.dimmed().bold(), message);
}

/// Render one change line, `Added: path` or `A path` when `short`.
#[must_use]
pub fn format_change(status: ChangeStatus, path: &str, short: bool) -> String {
    if short {
        format!("{} {path}", status.status_char())
    } else {
        format!("{}: {path}", status.label())
    }
}

fn colorize(status: ChangeStatus, line: &str) -> ColoredString {
    match status {
        ChangeStatus::Added => line.green(),
        ChangeStatus::Modified => line.yellow(),
        ChangeStatus::Deleted => line.red(),
    }
}

/// Print a change set to stdout, grouped by status and sorted by path.
pub fn print_changes(changes: &ChangeSet, short: bool) {
    for change in changes.sorted() {
        let line = format_change(change.status, &change.path, short);
        println!("{}", colorize(change.status, &line));
    }
}

/// One-line tally such as `2 added, 1 modified, 0 deleted`
#[must_use]
pub fn summarize(changes: &ChangeSet) -> String {
    format!(
        "{} added, {} modified, {} deleted",
        changes.added(),
        changes.modified(),
        changes.deleted()
    )
}
