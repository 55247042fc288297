use crate::error::{Result, SnapError};
use crate::storage::snapshots::{DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
use crate::tracking::diff::DEFAULT_PARALLEL_THRESHOLD;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration stored in `.subsys/config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub core: CoreConfig,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Deflate level for archive entries, 0..=9
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Ignore file, relative to the working-directory root
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
    #[serde(default)]
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceConfig {
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,
    /// Hash in parallel once at least this many files are eligible
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            ignore_file: default_ignore_file(),
            follow_symlinks: false,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            parallel_threads: default_parallel_threads(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// A missing file yields the defaults without creating it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists but cannot be read
    /// - The file contains invalid TOML
    /// - A value is out of range (see [`Config::validate`])
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SnapError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Self = toml::from_str(&content).map_err(|e| SnapError::ConfigParse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file as pretty TOML
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Cannot create parent directories
    /// - Cannot write to the file
    /// - TOML serialization fails
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SnapError::io(parent, e))?;
        }

        let toml_str =
            toml::to_string_pretty(self).map_err(|e| SnapError::InvalidConfig(e.to_string()))?;
        std::fs::write(path, toml_str).map_err(|e| SnapError::io(path, e))?;
        Ok(())
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::InvalidConfig`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if self.core.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(SnapError::InvalidConfig(format!(
                "core.compression_level must be between 0 and {MAX_COMPRESSION_LEVEL}, got {}",
                self.core.compression_level
            )));
        }
        if self.performance.parallel_threads == 0 {
            return Err(SnapError::InvalidConfig(
                "performance.parallel_threads must be at least 1".to_string(),
            ));
        }
        if self.tracking.ignore_file.trim().is_empty() {
            return Err(SnapError::InvalidConfig(
                "tracking.ignore_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// Default functions for serde
const fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

fn default_ignore_file() -> String {
    crate::DEFAULT_IGNORE_FILE.to_string()
}

fn default_parallel_threads() -> usize {
    crate::utils::thread_pool::default_threads()
}

const fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}
