//! Scenario Runner
//!
//! Interprets [`Scenario`] data against a [`PageDriver`].
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  for each scenario (registration order)                           │
//! │    cancelled? ──yes──► stop, mark run cancelled                   │
//! │    SessionContext::new(driver)                                    │
//! │      setup + actions   ── any error ──► Outcome::Errored          │
//! │      assertions        ── mismatch  ──► Outcome::Failed (stop)    │
//! │                        ── error     ──► Outcome::Errored          │
//! │      ───────────────────────────────► Outcome::Passed             │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step is bounded by [`RunnerConfig::step_timeout`]. A scenario's
//! failure never stops its siblings. Sequential runs share one driver and
//! rely on each scenario's setup navigation to reset the page; isolated runs
//! take a fresh driver per scenario from a [`DriverFactory`].

use crate::amount::{check_ascending, same_multiset};
use crate::config::RunnerConfig;
use crate::driver::{DriverFactory, ElementHandle, PageDriver, Viewport};
use crate::outcome::{AssertionFailure, Outcome, ScenarioResult, StepError, SuiteRun};
use crate::result::{EnsayoError, EnsayoResult};
use crate::scenario::{Action, Assertion, Scenario};
use crate::snapshot::{SnapshotComparator, SnapshotVerdict};
use futures::StreamExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag used to stop a run between scenarios
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    /// Create an unset flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Scenarios already started run to completion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

async fn bounded<T>(
    step: &str,
    limit: Duration,
    fut: impl Future<Output = EnsayoResult<T>>,
) -> EnsayoResult<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(EnsayoError::ActionTimeout {
            step: step.to_string(),
            ms: millis(limit),
        }),
    }
}

fn mismatch(
    description: String,
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> EnsayoResult<()> {
    Err(EnsayoError::AssertionFailed {
        description,
        expected: expected.into(),
        actual: actual.into(),
    })
}

/// Per-scenario session: the driver borrow plus captured values.
///
/// A new context is created for every scenario, so captures never leak
/// between scenarios.
pub struct SessionContext<'a, D: PageDriver + ?Sized> {
    driver: &'a mut D,
    config: &'a RunnerConfig,
    comparator: Option<&'a dyn SnapshotComparator>,
    captures: HashMap<String, Vec<String>>,
}

impl<D: PageDriver + ?Sized> std::fmt::Debug for SessionContext<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("captures", &self.captures)
            .field("has_comparator", &self.comparator.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a, D: PageDriver + ?Sized> SessionContext<'a, D> {
    /// Create a session over `driver`
    pub fn new(driver: &'a mut D, config: &'a RunnerConfig) -> Self {
        Self {
            driver,
            config,
            comparator: None,
            captures: HashMap::new(),
        }
    }

    /// Attach a snapshot comparator
    #[must_use]
    pub fn with_comparator(mut self, comparator: Option<&'a dyn SnapshotComparator>) -> Self {
        self.comparator = comparator;
        self
    }

    /// Texts captured under `name`
    #[must_use]
    pub fn captured(&self, name: &str) -> Option<&[String]> {
        self.captures.get(name).map(Vec::as_slice)
    }

    /// Setup and actions, then assertions; first problem decides the outcome
    pub async fn play(&mut self, scenario: &Scenario) -> Outcome {
        for action in scenario.setup.iter().chain(&scenario.actions) {
            if let Err(e) = self.perform(action).await {
                return Outcome::Errored(StepError::from_error(action.describe(), &e));
            }
        }

        for assertion in &scenario.assertions {
            match self.check(assertion).await {
                Ok(()) => {}
                Err(EnsayoError::AssertionFailed {
                    description,
                    expected,
                    actual,
                }) => {
                    return Outcome::Failed(AssertionFailure {
                        description,
                        expected,
                        actual,
                    });
                }
                Err(e) => {
                    return Outcome::Errored(StepError::from_error(assertion.describe(), &e));
                }
            }
        }
        Outcome::Passed
    }

    /// Execute one action.
    ///
    /// # Errors
    /// Returns the driver error, [`EnsayoError::LocatorNotFound`] for a
    /// missing target, [`EnsayoError::UnsupportedAction`] for empty text and
    /// [`EnsayoError::ActionTimeout`] when the step exceeds its bound.
    pub async fn perform(&mut self, action: &Action) -> EnsayoResult<()> {
        let step = action.describe();
        let limit = self.config.step_timeout;
        tracing::debug!(step = %step, "action");

        match action {
            Action::Navigate { url } => bounded(&step, limit, self.driver.navigate(url)).await,
            Action::SetViewport { width, height } => {
                let viewport = Viewport::new(*width, *height);
                bounded(&step, limit, self.driver.set_viewport(viewport)).await
            }
            Action::Type { selector, text } => {
                if text.is_empty() {
                    return Err(EnsayoError::unsupported(format!(
                        "cannot type an empty string into {selector}"
                    )));
                }
                let element = self.require(selector).await?;
                bounded(&step, limit, self.driver.type_text(&element, text)).await
            }
            Action::Click { selector } => {
                let element = self.require(selector).await?;
                bounded(&step, limit, self.driver.click(&element)).await
            }
            Action::WaitFor {
                selector,
                timeout_ms,
            } => {
                let wait = timeout_ms.map_or(limit, Duration::from_millis);
                bounded(&step, wait, self.driver.wait_for(selector, wait))
                    .await
                    .map(|_| ())
            }
            Action::Pause { ms } => {
                tokio::time::sleep(ms.map_or(self.config.settle_delay, Duration::from_millis))
                    .await;
                Ok(())
            }
            Action::CaptureTexts { selector, into } => {
                let texts = self.texts_of(selector).await?;
                tracing::debug!(capture = %into, count = texts.len(), "captured texts");
                let _ = self.captures.insert(into.clone(), texts);
                Ok(())
            }
        }
    }

    /// Evaluate one assertion.
    ///
    /// # Errors
    /// Returns [`EnsayoError::AssertionFailed`] on a mismatch and any other
    /// error when the check could not be carried out.
    pub async fn check(&mut self, assertion: &Assertion) -> EnsayoResult<()> {
        let description = assertion.describe();
        tracing::debug!(check = %description, "assertion");

        match assertion {
            Assertion::Exists { selector } => {
                if self.locate(selector).await?.is_none() {
                    return mismatch(description, "present", "absent");
                }
                Ok(())
            }
            Assertion::NotExists { selector } => {
                if self.locate(selector).await?.is_some() {
                    return mismatch(description, "absent", "present");
                }
                Ok(())
            }
            Assertion::TextEquals { selector, expected } => {
                let text = self.text_of(selector).await?;
                if text.trim() != expected.as_str() {
                    return mismatch(description, format!("{expected:?}"), format!("{:?}", text.trim()));
                }
                Ok(())
            }
            Assertion::TextContains { selector, expected } => {
                let text = self.text_of(selector).await?;
                if !text.contains(expected.as_str()) {
                    return mismatch(description, format!("{expected:?}"), format!("{text:?}"));
                }
                Ok(())
            }
            Assertion::AttributeEquals {
                selector,
                attribute,
                expected,
            } => match self.attribute_of(selector, attribute).await? {
                Some(value) if value == *expected => Ok(()),
                Some(value) => mismatch(description, format!("{expected:?}"), format!("{value:?}")),
                None => mismatch(description, format!("{expected:?}"), "no attribute"),
            },
            Assertion::AttributeContains {
                selector,
                attribute,
                expected,
            } => match self.attribute_of(selector, attribute).await? {
                Some(value) if value.contains(expected.as_str()) => Ok(()),
                Some(value) => mismatch(description, format!("{expected:?}"), format!("{value:?}")),
                None => mismatch(description, format!("{expected:?}"), "no attribute"),
            },
            Assertion::Enabled { selector } => {
                let element = self.require(selector).await?;
                let step = description.clone();
                let enabled =
                    bounded(&step, self.config.step_timeout, self.driver.is_enabled(&element))
                        .await?;
                if !enabled {
                    return mismatch(description, "enabled", "disabled");
                }
                Ok(())
            }
            Assertion::Checked { selector, expected } => {
                let element = self.require(selector).await?;
                let step = description.clone();
                let checked =
                    bounded(&step, self.config.step_timeout, self.driver.is_checked(&element))
                        .await?;
                if checked != *expected {
                    return mismatch(description, expected.to_string(), checked.to_string());
                }
                Ok(())
            }
            Assertion::AscendingAmounts { selector, strict } => {
                let texts = self.texts_of(selector).await?;
                if texts.is_empty() {
                    return Err(EnsayoError::LocatorNotFound {
                        selector: selector.clone(),
                    });
                }
                match check_ascending(&texts, *strict) {
                    Ok(_) => Ok(()),
                    Err(violation) => mismatch(
                        description,
                        if *strict { "strictly ascending" } else { "ascending" },
                        violation.to_string(),
                    ),
                }
            }
            Assertion::SameTextsAs { selector, captured } => {
                let Some(before) = self.captures.get(captured).cloned() else {
                    return Err(EnsayoError::unsupported(format!(
                        "nothing captured as '{captured}'"
                    )));
                };
                let after = self.texts_of(selector).await?;
                if same_multiset(&before, &after) {
                    return Ok(());
                }
                let stray = after
                    .iter()
                    .find(|t| !before.contains(t))
                    .map_or_else(String::new, |t| format!(", first unexpected {t:?}"));
                mismatch(
                    description,
                    format!("{} texts captured as '{captured}'", before.len()),
                    format!("{} texts{stray}", after.len()),
                )
            }
            Assertion::VisualSnapshot { selector, name } => {
                let Some(comparator) = self.comparator else {
                    return Err(EnsayoError::unsupported(
                        "no snapshot comparator configured",
                    ));
                };
                let element = self.require(selector).await?;
                let step = description.clone();
                let png =
                    bounded(&step, self.config.step_timeout, self.driver.screenshot(&element))
                        .await?;
                match comparator.compare(name, &png)? {
                    SnapshotVerdict::Mismatch { expected, actual } => mismatch(
                        description,
                        format!("baseline {expected}"),
                        format!("screenshot {actual}"),
                    ),
                    verdict => {
                        tracing::debug!(snapshot = %name, ?verdict, "snapshot accepted");
                        Ok(())
                    }
                }
            }
        }
    }

    async fn locate(&mut self, selector: &str) -> EnsayoResult<Option<ElementHandle>> {
        let step = format!("locate {selector}");
        bounded(&step, self.config.step_timeout, self.driver.locate(selector)).await
    }

    async fn require(&mut self, selector: &str) -> EnsayoResult<ElementHandle> {
        self.locate(selector)
            .await?
            .ok_or_else(|| EnsayoError::LocatorNotFound {
                selector: selector.to_string(),
            })
    }

    async fn text_of(&mut self, selector: &str) -> EnsayoResult<String> {
        let element = self.require(selector).await?;
        let step = format!("read text of {selector}");
        bounded(&step, self.config.step_timeout, self.driver.text(&element)).await
    }

    async fn attribute_of(&mut self, selector: &str, name: &str) -> EnsayoResult<Option<String>> {
        let element = self.require(selector).await?;
        let step = format!("read {name} of {selector}");
        bounded(
            &step,
            self.config.step_timeout,
            self.driver.attribute(&element, name),
        )
        .await
    }

    async fn texts_of(&mut self, selector: &str) -> EnsayoResult<Vec<String>> {
        let step = format!("read texts of {selector}");
        let limit = self.config.step_timeout;
        let elements = bounded(&step, limit, self.driver.locate_all(selector)).await?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in &elements {
            texts.push(bounded(&step, limit, self.driver.text(element)).await?);
        }
        Ok(texts)
    }
}

/// Run one scenario on `driver` and time it
pub async fn execute_scenario<D: PageDriver + ?Sized>(
    driver: &mut D,
    scenario: &Scenario,
    config: &RunnerConfig,
    comparator: Option<&dyn SnapshotComparator>,
) -> ScenarioResult {
    let started = Instant::now();
    tracing::info!(scenario = %scenario.name, group = %scenario.group, "running scenario");

    let outcome = SessionContext::new(driver, config)
        .with_comparator(comparator)
        .play(scenario)
        .await;

    match &outcome {
        Outcome::Passed => tracing::info!(scenario = %scenario.name, "passed"),
        Outcome::Failed(failure) => {
            tracing::warn!(scenario = %scenario.name, %failure, "failed");
        }
        Outcome::Errored(error) => tracing::warn!(scenario = %scenario.name, %error, "errored"),
    }
    ScenarioResult::new(&scenario.name, &scenario.group, outcome, started.elapsed())
}

/// Sequential runner reusing one driver
pub struct ScenarioRunner<D: PageDriver> {
    driver: D,
    config: RunnerConfig,
    comparator: Option<Arc<dyn SnapshotComparator>>,
    cancellation: CancellationFlag,
}

impl<D: PageDriver> std::fmt::Debug for ScenarioRunner<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("config", &self.config)
            .field("has_comparator", &self.comparator.is_some())
            .field("cancellation", &self.cancellation)
            .finish_non_exhaustive()
    }
}

impl<D: PageDriver> ScenarioRunner<D> {
    /// Create a runner over `driver`
    #[must_use]
    pub fn new(driver: D, config: RunnerConfig) -> Self {
        Self {
            driver,
            config,
            comparator: None,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Attach a snapshot comparator
    #[must_use]
    pub fn with_comparator(mut self, comparator: Arc<dyn SnapshotComparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Use an externally owned cancellation flag
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Handle for cancelling this runner
    #[must_use]
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Runner configuration
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Underlying driver
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// Run one scenario
    pub async fn run(&mut self, scenario: &Scenario) -> ScenarioResult {
        execute_scenario(
            &mut self.driver,
            scenario,
            &self.config,
            self.comparator.as_deref(),
        )
        .await
    }

    /// Run scenarios in order; results keep registration order
    pub async fn run_all(&mut self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        self.run_suite("", scenarios, |_| {}).await.results
    }

    /// Run scenarios as a named suite, reporting each result as it lands
    pub async fn run_suite(
        &mut self,
        name: &str,
        scenarios: &[Scenario],
        mut on_result: impl FnMut(&ScenarioResult),
    ) -> SuiteRun {
        let started = Instant::now();
        let mut run = SuiteRun::start(name);

        for scenario in scenarios {
            if self.cancellation.is_cancelled() {
                tracing::warn!(
                    remaining = scenarios.len() - run.results.len(),
                    "run cancelled"
                );
                run.cancelled = true;
                break;
            }
            let result = self.run(scenario).await;
            on_result(&result);
            run.results.push(result);
        }

        run.duration = started.elapsed();
        run
    }

    /// Release the driver
    ///
    /// # Errors
    /// Returns the driver's close error.
    pub async fn close(mut self) -> EnsayoResult<()> {
        self.driver.close().await
    }
}

/// Parallel runner giving every scenario its own page context
pub struct IsolatedRunner<F: DriverFactory> {
    factory: F,
    config: RunnerConfig,
    comparator: Option<Arc<dyn SnapshotComparator>>,
    cancellation: CancellationFlag,
}

impl<F: DriverFactory> std::fmt::Debug for IsolatedRunner<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IsolatedRunner")
            .field("config", &self.config)
            .field("has_comparator", &self.comparator.is_some())
            .finish_non_exhaustive()
    }
}

impl<F: DriverFactory> IsolatedRunner<F> {
    /// Create a runner drawing drivers from `factory`
    #[must_use]
    pub fn new(factory: F, config: RunnerConfig) -> Self {
        Self {
            factory,
            config,
            comparator: None,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Attach a snapshot comparator
    #[must_use]
    pub fn with_comparator(mut self, comparator: Arc<dyn SnapshotComparator>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Use an externally owned cancellation flag
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Handle for cancelling this runner
    #[must_use]
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Run up to `config.concurrency` scenarios at once.
    ///
    /// Results are buffered so they come back in registration order.
    pub async fn run_suite(
        &self,
        name: &str,
        scenarios: &[Scenario],
        mut on_result: impl FnMut(&ScenarioResult),
    ) -> SuiteRun {
        let started = Instant::now();
        let mut run = SuiteRun::start(name);
        let factory = &self.factory;
        let config = &self.config;
        let comparator = self.comparator.as_deref();
        let cancellation = &self.cancellation;

        let mut results = futures::stream::iter(scenarios)
            .map(move |scenario| async move {
                if cancellation.is_cancelled() {
                    return None;
                }
                Some(run_fresh(factory, scenario, config, comparator).await)
            })
            .buffered(config.concurrency.max(1));

        while let Some(result) = results.next().await {
            match result {
                Some(result) => {
                    on_result(&result);
                    run.results.push(result);
                }
                None => run.cancelled = true,
            }
        }

        if run.cancelled {
            tracing::warn!(completed = run.results.len(), "run cancelled");
        }
        run.duration = started.elapsed();
        run
    }

    /// Run scenarios, returning results in registration order
    pub async fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        self.run_suite("", scenarios, |_| {}).await.results
    }
}

async fn run_fresh<F: DriverFactory>(
    factory: &F,
    scenario: &Scenario,
    config: &RunnerConfig,
    comparator: Option<&dyn SnapshotComparator>,
) -> ScenarioResult {
    let mut driver = match factory.create().await {
        Ok(driver) => driver,
        Err(e) => {
            return ScenarioResult::new(
                &scenario.name,
                &scenario.group,
                Outcome::Errored(StepError::from_error("create page context", &e)),
                Duration::ZERO,
            );
        }
    };
    let result = execute_scenario(&mut driver, scenario, config, comparator).await;
    if let Err(e) = driver.close().await {
        tracing::warn!(error = %e, "failed to close page context");
    }
    result
}
