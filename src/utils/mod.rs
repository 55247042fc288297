//! Utility functions and helpers.
//!
//! - [`hash`]: SHA-256 content digests
//! - [`paths`]: slash-normalized relative paths
//! - [`thread_pool`]: shared rayon pool for parallel hashing

/// Content digests
pub mod hash;
/// Path manipulation and resolution utilities
pub mod paths;
/// Thread pool configuration for parallel operations
pub mod thread_pool;

/// Formats a file size in bytes into a human-readable string with appropriate units.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size.round() as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
