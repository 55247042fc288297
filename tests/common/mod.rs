#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use subsys::SnapContext;
use subsys::config::Config;
use subsys::tracking::{DiffOptions, DiffOutcome, IgnoreList, diff};
use tempfile::TempDir;

/// Working-directory fixture with an initialized state layout
pub struct TestTree {
    pub temp_dir: TempDir,
    pub ctx: SnapContext,
}

impl TestTree {
    /// Create an initialized tree with the default ignore file
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        subsys::commands::init::init_directory(temp_dir.path())?;
        let ctx = SnapContext::open(temp_dir.path())?;
        Ok(Self { temp_dir, ctx })
    }

    /// Create an uninitialized tree
    pub fn bare() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let ctx = SnapContext::new(temp_dir.path().to_path_buf(), Config::default());
        Ok(Self { temp_dir, ctx })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to a root-relative path, creating parents
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn remove(&self, relative: &str) -> Result<()> {
        fs::remove_file(self.root().join(relative))?;
        Ok(())
    }

    /// Run a persisting diff with default options
    pub fn diff(&self, ignore: &IgnoreList) -> Result<DiffOutcome> {
        Ok(diff::diff(self.root(), ignore, &DiffOptions::default())?)
    }
}

/// Sorted `(status char, path)` pairs for order-independent assertions
pub fn change_pairs(outcome: &DiffOutcome) -> Vec<(char, String)> {
    let mut pairs: Vec<(char, String)> = outcome
        .changes
        .iter()
        .map(|c| (c.status.status_char(), c.path.clone()))
        .collect();
    pairs.sort();
    pairs
}
