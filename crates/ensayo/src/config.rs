//! Runner configuration.

use crate::driver::Viewport;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound for a single action or assertion (10 seconds)
pub const DEFAULT_STEP_TIMEOUT_MS: u64 = 10_000;

/// Default settle delay for animation-dependent checks (500ms)
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;

/// Configuration for [`ScenarioRunner`](crate::ScenarioRunner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Upper bound for each action/assertion
    pub step_timeout: Duration,
    /// Delay used by `pause` actions that do not name one
    pub settle_delay: Duration,
    /// Viewport applied when a suite does not declare one
    pub viewport: Viewport,
    /// Scenarios run at once in isolated mode
    pub concurrency: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_millis(DEFAULT_STEP_TIMEOUT_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
            viewport: Viewport::default(),
            concurrency: 1,
        }
    }
}

impl RunnerConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set step timeout
    #[must_use]
    pub const fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Set settle delay
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set default viewport
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport::new(width, height);
        self
    }

    /// Set concurrency for isolated runs (0 is treated as 1)
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Step timeout in whole milliseconds
    #[must_use]
    pub fn step_timeout_ms(&self) -> u64 {
        u64::try_from(self.step_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RunnerConfig::default();
        assert_eq!(config.step_timeout_ms(), DEFAULT_STEP_TIMEOUT_MS);
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_config_builder() {
        let config = RunnerConfig::new()
            .with_step_timeout(Duration::from_millis(250))
            .with_settle_delay(Duration::ZERO)
            .with_viewport(1800, 1000)
            .with_concurrency(4);

        assert_eq!(config.step_timeout_ms(), 250);
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.viewport, Viewport::new(1800, 1000));
        assert_eq!(config.concurrency, 4);
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let config = RunnerConfig::new().with_concurrency(0);
        assert_eq!(config.concurrency, 1);
    }
}
