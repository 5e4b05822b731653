//! Scenario and suite outcomes.

use crate::result::EnsayoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// First failing assertion of a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionFailure {
    /// What was checked
    pub description: String,
    /// Expected value
    pub expected: String,
    /// Observed value
    pub actual: String,
}

impl std::fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.description, self.expected, self.actual
        )
    }
}

/// Unexpected condition raised by a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepError {
    /// Error kind (e.g. `LocatorNotFound`)
    pub kind: String,
    /// Step that raised it
    pub step: String,
    /// Error message
    pub message: String,
}

impl StepError {
    /// Capture an error raised while executing `step`
    #[must_use]
    pub fn from_error(step: impl Into<String>, error: &EnsayoError) -> Self {
        Self {
            kind: error.kind().to_string(),
            step: step.into(),
            message: error.to_string(),
        }
    }
}

impl std::fmt::Display for StepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.step, self.message)
    }
}

/// Outcome of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every assertion held
    Passed,
    /// An assertion did not hold
    Failed(AssertionFailure),
    /// A step raised an unexpected condition
    Errored(StepError),
}

impl Outcome {
    /// Check if passed
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Check if errored
    #[must_use]
    pub const fn is_errored(&self) -> bool {
        matches!(self, Self::Errored(_))
    }

    /// Short label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "pass",
            Self::Failed(_) => "fail",
            Self::Errored(_) => "error",
        }
    }
}

/// Result of running one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Scenario description
    pub name: String,
    /// Group the scenario belongs to
    pub group: String,
    /// Outcome
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Wall time spent
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a result
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        outcome: Outcome,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            outcome,
            duration,
        }
    }
}

/// Ordered results of a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteRun {
    /// Suite name
    pub name: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Results in registration order
    pub results: Vec<ScenarioResult>,
    /// Total wall time
    pub duration: Duration,
    /// Whether the run was cancelled before every scenario started
    pub cancelled: bool,
}

impl SuiteRun {
    /// Start an empty run now
    #[must_use]
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: Utc::now(),
            results: Vec::new(),
            duration: Duration::ZERO,
            cancelled: false,
        }
    }

    /// Passed count
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    /// Failed count
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }

    /// Errored count
    #[must_use]
    pub fn errored_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_errored()).count()
    }

    /// Total recorded results
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    /// True when nothing failed or errored and the run was not cancelled
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.passed_count() == self.total_count()
    }

    /// Results that did not pass
    pub fn problems(&self) -> impl Iterator<Item = &ScenarioResult> {
        self.results.iter().filter(|r| !r.outcome.is_passed())
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} passed, {} failed, {} errored ({} total){}",
            self.name,
            self.passed_count(),
            self.failed_count(),
            self.errored_count(),
            self.total_count(),
            if self.cancelled { ", cancelled" } else { "" }
        )
    }
}
