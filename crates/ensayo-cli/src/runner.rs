//! Suite loading and execution for the CLI

use crate::commands::{RunArgs, SuiteArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use ensayo::{
    CancellationFlag, FixtureLoader, ReportFormat, ScenarioRegistry, SuiteRun, SuiteSpec,
};
use std::path::Path;
use tokio::task::JoinHandle;

/// Cancel `flag` on Ctrl-C.
///
/// Abort the returned task once the run is over so the default handler is
/// back in place for the rest of the process.
pub fn cancel_on_interrupt(flag: CancellationFlag) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing scenarios already started");
            flag.cancel();
        }
    })
}

/// A validated suite together with its expanded scenarios
#[derive(Debug)]
pub struct LoadedSuite {
    /// Parsed suite file
    pub spec: SuiteSpec,
    /// Scenarios after fixture expansion and filtering
    pub registry: ScenarioRegistry,
}

/// Drives the library from parsed CLI arguments
#[derive(Debug)]
pub struct SuiteRunner {
    config: CliConfig,
    reporter: ProgressReporter,
    cancellation: CancellationFlag,
}

impl SuiteRunner {
    /// Create a runner from CLI configuration
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self {
            config,
            reporter,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Flag that stops `run` between scenarios
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    /// Get the configuration
    #[must_use]
    pub const fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Load, validate and expand a suite.
    ///
    /// Fixture problems abort here, before any browser is started.
    pub fn load(
        &self,
        path: &Path,
        filter: Option<&str>,
        base_url: Option<&str>,
    ) -> CliResult<LoadedSuite> {
        let mut spec = SuiteSpec::load(path)?;
        if let Some(url) = base_url {
            spec = spec.with_base_url(url);
        }
        spec.validate()?;

        let fixtures = FixtureLoader::new(&self.config.fixtures_dir);
        let mut registry = spec.expand(&fixtures, self.config.runner_config().viewport)?;
        if let Some(pattern) = filter {
            registry = registry.filtered(pattern);
        }

        tracing::debug!(
            suite = %spec.name,
            scenarios = registry.len(),
            "suite loaded"
        );
        Ok(LoadedSuite { spec, registry })
    }

    /// Check a suite and print what it expands to
    pub fn validate(&self, args: &SuiteArgs) -> CliResult<LoadedSuite> {
        let loaded = self.load(&args.suite, args.filter.as_deref(), None)?;
        self.reporter.success(&format!(
            "{} is valid: {} groups, {} scenarios",
            args.suite.display(),
            loaded.spec.groups.len(),
            loaded.registry.len()
        ));
        Ok(loaded)
    }

    /// Render the scenario listing, grouped
    #[must_use]
    pub fn render_listing(loaded: &LoadedSuite) -> String {
        let mut out = format!("{}\n", loaded.spec.name);
        let mut group = None;
        for scenario in loaded.registry.scenarios() {
            if group != Some(scenario.group.as_str()) {
                out.push_str(&format!("  {}\n", scenario.group));
                group = Some(scenario.group.as_str());
            }
            out.push_str(&format!(
                "    {} ({} steps)\n",
                scenario.name,
                scenario.step_count()
            ));
        }
        out.push_str(&format!("{} scenarios\n", loaded.registry.len()));
        out
    }

    /// Print every scenario a suite expands to
    pub fn list(&self, args: &SuiteArgs) -> CliResult<LoadedSuite> {
        let loaded = self.load(&args.suite, args.filter.as_deref(), None)?;
        print!("{}", Self::render_listing(&loaded));
        Ok(loaded)
    }

    /// Write the report for `run` to `--output` or stdout
    pub fn emit_report(&self, run: &SuiteRun, args: &RunArgs) -> CliResult<()> {
        let format = ReportFormat::from(args.format);
        match args.output {
            Some(ref path) => {
                format.write(run, path)?;
                self.reporter
                    .info(&format!("report written to {}", path.display()));
            }
            None => print!("{}", format.render(run)?),
        }
        Ok(())
    }

    /// Map a finished run to the process result
    pub fn verdict(run: &SuiteRun) -> CliResult<()> {
        if run.cancelled {
            Err(CliError::Interrupted {
                completed: run.total_count(),
            })
        } else if run.is_success() {
            Ok(())
        } else {
            Err(CliError::ScenariosFailed {
                failed: run.total_count() - run.passed_count(),
                total: run.total_count(),
            })
        }
    }

    /// Run a suite against a real browser
    #[cfg(feature = "browser")]
    pub async fn run(&mut self, args: &RunArgs) -> CliResult<SuiteRun> {
        use ensayo::{
            BaselineStore, BrowserConfig, ChromiumBrowser, ChromiumFactory, IsolatedRunner,
            ScenarioRunner,
        };
        use std::sync::Arc;

        let loaded = self.load(
            &args.suite.suite,
            args.suite.filter.as_deref(),
            args.base_url.as_deref(),
        )?;
        let runner_config = self.config.runner_config();
        let comparator = Arc::new(BaselineStore::new(self.config.snapshot_config()));

        let mut browser_config = BrowserConfig::default()
            .with_viewport(loaded.spec.viewport.unwrap_or(runner_config.viewport))
            .with_headed(args.headed);
        if args.no_sandbox {
            browser_config = browser_config.with_no_sandbox();
        }
        if let Some(ref path) = args.chromium {
            browser_config = browser_config.with_chromium_path(path);
        }

        let browser = Arc::new(ChromiumBrowser::launch(browser_config).await?);
        self.reporter.header(&loaded.spec.name);
        self.reporter
            .start_progress(loaded.registry.len() as u64, "Running scenarios");

        let interrupt = cancel_on_interrupt(self.cancellation.clone());
        let reporter = &self.reporter;
        let scenarios = loaded.registry.scenarios();
        let run = if runner_config.concurrency > 1 {
            IsolatedRunner::new(ChromiumFactory::new(browser.clone()), runner_config)
                .with_comparator(comparator)
                .with_cancellation(self.cancellation.clone())
                .run_suite(&loaded.spec.name, scenarios, |r| reporter.scenario(r))
                .await
        } else {
            let driver = browser.new_driver().await?;
            let mut runner = ScenarioRunner::new(driver, runner_config)
                .with_comparator(comparator)
                .with_cancellation(self.cancellation.clone());
            let run = runner
                .run_suite(&loaded.spec.name, scenarios, |r| reporter.scenario(r))
                .await;
            runner.close().await?;
            run
        };
        interrupt.abort();

        self.reporter.finish();
        self.reporter.summary(&run);
        if run.cancelled {
            self.reporter
                .warning("interrupted: remaining scenarios were not started");
        }

        match Arc::try_unwrap(browser) {
            Ok(browser) => browser.close().await?,
            Err(_) => tracing::warn!("browser still shared, leaving it to exit with the process"),
        }
        Ok(run)
    }
}
