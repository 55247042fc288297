use crate::error::SnapError;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Renders `path` relative to `base` with `/` separators.
///
/// Returns `Ok(None)` when `path` does not live under `base`. The root itself
/// renders as an empty string.
///
/// # Errors
///
/// Returns [`SnapError::NonUtf8Path`] if a component is not valid UTF-8, so
/// two distinct names can never collapse into the same relative path.
pub fn to_slash_relative(path: &Path, base: &Path) -> crate::Result<Option<String>> {
    let Ok(relative) = path.strip_prefix(base) else {
        return Ok(None);
    };

    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part
                .to_str()
                .ok_or_else(|| SnapError::NonUtf8Path(path.to_path_buf()))?;
            parts.push(part);
        }
    }
    Ok(Some(parts.join("/")))
}

/// Makes a path absolute, resolving relative paths from current directory
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined
pub fn make_absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let current_dir = std::env::current_dir()?;
        Ok(current_dir.join(path))
    }
}
