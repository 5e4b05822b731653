//! Visual snapshot comparison.
//!
//! The runner treats visual comparison as an opaque verdict: it hands the
//! element's PNG bytes to a [`SnapshotComparator`] and records what comes
//! back. [`BaselineStore`] is the bundled comparator. It keeps one baseline
//! per snapshot name and compares SHA-256 digests; it does no pixel diffing.

use crate::result::{EnsayoError, EnsayoResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Verdict of a visual comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SnapshotVerdict {
    /// Screenshot matches the baseline
    Matched,
    /// No baseline existed; the screenshot became the baseline
    BaselineCreated,
    /// Baseline overwritten in update mode
    BaselineUpdated,
    /// Screenshot differs from the baseline
    Mismatch {
        /// Baseline digest
        expected: String,
        /// Screenshot digest
        actual: String,
    },
}

impl SnapshotVerdict {
    /// Whether the verdict counts as a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        !matches!(self, Self::Mismatch { .. })
    }
}

/// Opaque visual comparison capability
pub trait SnapshotComparator: Send + Sync {
    /// Compare `png` against the snapshot called `name`
    fn compare(&self, name: &str, png: &[u8]) -> EnsayoResult<SnapshotVerdict>;
}

/// Configuration for snapshot testing
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Overwrite baselines instead of comparing
    pub update_snapshots: bool,
    /// Directory holding `<name>.png` baselines
    pub snapshot_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            update_snapshots: false,
            snapshot_dir: PathBuf::from("__snapshots__"),
        }
    }
}

impl SnapshotConfig {
    /// Set update mode
    #[must_use]
    pub const fn with_update(mut self, update: bool) -> Self {
        self.update_snapshots = update;
        self
    }

    /// Set snapshot directory
    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }
}

/// Baselines on disk, compared by digest
#[derive(Debug, Clone)]
pub struct BaselineStore {
    config: SnapshotConfig,
}

impl BaselineStore {
    /// Create a store from config
    #[must_use]
    pub const fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Baseline path for `name`
    #[must_use]
    pub fn baseline_path(&self, name: &str) -> PathBuf {
        self.config.snapshot_dir.join(format!("{name}.png"))
    }

    /// Directory holding baselines
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.config.snapshot_dir
    }

    fn write_baseline(&self, name: &str, png: &[u8]) -> EnsayoResult<()> {
        std::fs::create_dir_all(&self.config.snapshot_dir)?;
        std::fs::write(self.baseline_path(name), png)?;
        Ok(())
    }
}

/// Hex SHA-256 digest of `data`
#[must_use]
pub fn digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

impl SnapshotComparator for BaselineStore {
    fn compare(&self, name: &str, png: &[u8]) -> EnsayoResult<SnapshotVerdict> {
        if png.is_empty() {
            return Err(EnsayoError::Snapshot {
                name: name.to_string(),
                message: "screenshot is empty".to_string(),
            });
        }

        let path = self.baseline_path(name);
        if self.config.update_snapshots {
            self.write_baseline(name, png)?;
            tracing::info!(snapshot = name, "updated baseline");
            return Ok(SnapshotVerdict::BaselineUpdated);
        }

        if !path.exists() {
            self.write_baseline(name, png)?;
            tracing::info!(snapshot = name, path = %path.display(), "created baseline");
            return Ok(SnapshotVerdict::BaselineCreated);
        }

        let expected = digest(&std::fs::read(&path)?);
        let actual = digest(png);
        if expected == actual {
            Ok(SnapshotVerdict::Matched)
        } else {
            tracing::warn!(snapshot = name, "visual snapshot differs from baseline");
            Ok(SnapshotVerdict::Mismatch { expected, actual })
        }
    }
}
