//! Ensayo: declarative, data-driven end-to-end UI scenario runner
//!
//! Ensayo (Spanish: "rehearsal") runs end-to-end UI scenarios described as
//! data. A scenario is an ordered list of actions followed by an ordered list
//! of assertions; one generic runner interprets every scenario against a
//! browser-automation capability.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    ENSAYO Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Suite YAML │    │ Scenario   │    │ PageDriver │            │
//! │   │ + Fixtures │───►│ Runner     │───►│ (chromium  │            │
//! │   │            │    │            │    │  or mock)  │            │
//! │   └────────────┘    └─────┬──────┘    └────────────┘            │
//! │                           ▼                                     │
//! │                     SuiteRun ──► text / JSON / JUnit            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ensayo::{FixtureLoader, MockDriver, MockPage, RunnerConfig, ScenarioRunner, SuiteSpec};
//!
//! # async fn demo() -> ensayo::EnsayoResult<()> {
//! let suite = SuiteSpec::load("suites/hackathon.yaml".as_ref())?;
//! let config = RunnerConfig::default();
//! let registry = suite.expand(&FixtureLoader::new("fixtures"), config.viewport)?;
//!
//! let mut runner = ScenarioRunner::new(MockDriver::with_page(MockPage::new()), config);
//! let run = runner.run_suite(&suite.name, registry.scenarios(), |_| {}).await;
//! println!("{}", run.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod amount;
mod browser;
mod config;
mod driver;
mod fixture;
mod login;
mod outcome;
mod reporter;
mod result;
mod runner;
mod scenario;
mod snapshot;
mod suite;

/// In-memory page capability for tests
pub mod mock;

pub use amount::{check_ascending, parse_amount, same_multiset, OrderViolation};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{ChromiumBrowser, ChromiumDriver, ChromiumFactory};
pub use config::{RunnerConfig, DEFAULT_SETTLE_DELAY_MS, DEFAULT_STEP_TIMEOUT_MS};
pub use driver::{DriverFactory, ElementHandle, FnDriverFactory, PageDriver, Viewport};
pub use fixture::{FixtureLoader, FixtureRow};
pub use login::{describe_row, expand_login, LoginForm};
pub use mock::{MockDom, MockDriver, MockElement, MockPage};
pub use outcome::{AssertionFailure, Outcome, ScenarioResult, StepError, SuiteRun};
pub use reporter::{render_json, render_junit, render_text, ReportFormat};
pub use result::{EnsayoError, EnsayoResult};
pub use runner::{
    execute_scenario, CancellationFlag, IsolatedRunner, ScenarioRunner, SessionContext,
};
pub use scenario::{Action, Assertion, Scenario, ScenarioRegistry};
pub use snapshot::{digest, BaselineStore, SnapshotComparator, SnapshotConfig, SnapshotVerdict};
pub use suite::{DataDrivenSpec, GroupSpec, ScenarioSpec, SuiteSpec, SUITE_VERSION};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::driver::*;
    pub use super::fixture::*;
    pub use super::outcome::*;
    pub use super::result::*;
    pub use super::runner::*;
    pub use super::scenario::*;
    pub use super::suite::*;
    pub use super::{BaselineStore, RunnerConfig, SnapshotComparator, SnapshotConfig};
}
