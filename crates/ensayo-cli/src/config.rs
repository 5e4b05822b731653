//! CLI configuration

use ensayo::{RunnerConfig, SnapshotConfig, DEFAULT_SETTLE_DELAY_MS, DEFAULT_STEP_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// Map `-q` and the `-v` count to a level
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default tracing filter when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Directory holding fixture datasets
    pub fixtures_dir: PathBuf,
    /// Directory holding snapshot baselines
    pub snapshot_dir: PathBuf,
    /// Overwrite baselines instead of comparing
    pub update_snapshots: bool,
    /// Scenarios run at once (1 = sequential on one page)
    pub jobs: usize,
    /// Per-step timeout in milliseconds
    pub timeout_ms: u64,
    /// Default pause in milliseconds
    pub settle_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            fixtures_dir: PathBuf::from("fixtures"),
            snapshot_dir: PathBuf::from("__snapshots__"),
            update_snapshots: false,
            jobs: 1,
            timeout_ms: DEFAULT_STEP_TIMEOUT_MS,
            settle_ms: DEFAULT_SETTLE_DELAY_MS,
        }
    }
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set fixtures directory
    #[must_use]
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Set snapshot directory
    #[must_use]
    pub fn with_snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = dir.into();
        self
    }

    /// Set snapshot update mode
    #[must_use]
    pub const fn with_update_snapshots(mut self, update: bool) -> Self {
        self.update_snapshots = update;
        self
    }

    /// Set parallel jobs (0 is treated as 1)
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Set step timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set settle delay
    #[must_use]
    pub const fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Runner settings derived from this configuration
    #[must_use]
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_step_timeout(Duration::from_millis(self.timeout_ms))
            .with_settle_delay(Duration::from_millis(self.settle_ms))
            .with_concurrency(self.jobs)
    }

    /// Snapshot settings derived from this configuration
    #[must_use]
    pub fn snapshot_config(&self) -> SnapshotConfig {
        SnapshotConfig::default()
            .with_dir(self.snapshot_dir.clone())
            .with_update(self.update_snapshots)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod verbosity_tests {
        use super::*;

        #[test]
        fn test_default_verbosity() {
            assert_eq!(Verbosity::default(), Verbosity::Normal);
        }

        #[test]
        fn test_from_flags() {
            assert_eq!(Verbosity::from_flags(true, 3), Verbosity::Quiet);
            assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
            assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
            assert_eq!(Verbosity::from_flags(false, 5), Verbosity::Debug);
        }

        #[test]
        fn test_is_verbose() {
            assert!(!Verbosity::Quiet.is_verbose());
            assert!(!Verbosity::Normal.is_verbose());
            assert!(Verbosity::Verbose.is_verbose());
            assert!(Verbosity::Debug.is_verbose());
        }

        #[test]
        fn test_log_filter() {
            assert_eq!(Verbosity::Quiet.log_filter(), "error");
            assert_eq!(Verbosity::Debug.log_filter(), "debug");
        }
    }

    mod color_tests {
        use super::*;

        #[test]
        fn test_explicit_choices() {
            assert!(ColorChoice::Always.should_color());
            assert!(!ColorChoice::Never.should_color());
        }
    }

    mod cli_config_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = CliConfig::default();
            assert_eq!(config.fixtures_dir, PathBuf::from("fixtures"));
            assert_eq!(config.jobs, 1);
            assert_eq!(config.timeout_ms, DEFAULT_STEP_TIMEOUT_MS);
            assert!(!config.update_snapshots);
        }

        #[test]
        fn test_runner_config() {
            let runner = CliConfig::new()
                .with_timeout_ms(2_000)
                .with_settle_ms(0)
                .with_jobs(0)
                .runner_config();
            assert_eq!(runner.step_timeout_ms(), 2_000);
            assert_eq!(runner.settle_delay, Duration::ZERO);
            assert_eq!(runner.concurrency, 1);
        }

        #[test]
        fn test_snapshot_config() {
            let snapshots = CliConfig::new()
                .with_snapshot_dir("shots")
                .with_update_snapshots(true)
                .snapshot_config();
            assert!(snapshots.update_snapshots);
            assert_eq!(snapshots.snapshot_dir, PathBuf::from("shots"));
        }
    }
}
