//! Terminal output and progress reporting

use console::{style, Style, Term};
use ensayo::{Outcome, ScenarioResult, SuiteRun};
use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for suite execution
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Record one finished scenario
    pub fn scenario(&self, result: &ScenarioResult) {
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
            pb.set_message(result.name.clone());
        }

        let line = format!("{} ({}ms)", result.name, result.duration.as_millis());
        match &result.outcome {
            Outcome::Passed => self.success(&line),
            Outcome::Failed(failure) => self.failure(&format!("{line}: {failure}")),
            Outcome::Errored(error) => self.failure(&format!("{line}: {error}")),
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn write(&self, message: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(message),
            None => {
                let _ = self.term.write_line(message);
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        self.write(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        self.write(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        self.write(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        self.write(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.write("");
        self.write(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, run: &SuiteRun) {
        let problems = run.total_count() - run.passed_count();
        if self.quiet && problems == 0 {
            return;
        }

        let duration_secs = run.duration.as_secs_f64();
        let status = if run.is_success() { "PASSED" } else { "FAILED" };
        let cancelled = if run.cancelled { " (cancelled)" } else { "" };

        let line = if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let status = if run.is_success() {
                passed_style.apply_to(status)
            } else {
                failed_style.apply_to(status)
            };
            format!(
                "{status} {} scenarios in {duration_secs:.2}s ({} passed, {} failed, {} errored){cancelled}",
                run.total_count(),
                passed_style.apply_to(run.passed_count()),
                failed_style.apply_to(run.failed_count()),
                failed_style.apply_to(run.errored_count()),
            )
        } else {
            format!(
                "{status} {} scenarios in {duration_secs:.2}s ({} passed, {} failed, {} errored){cancelled}",
                run.total_count(),
                run.passed_count(),
                run.failed_count(),
                run.errored_count(),
            )
        };

        self.write("");
        self.write(&line);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use ensayo::{AssertionFailure, StepError};
    use std::time::Duration;

    fn sample_run() -> SuiteRun {
        let mut run = SuiteRun::start("demo");
        run.results.push(ScenarioResult::new(
            "page elements are present",
            "Login Page UI Elements Test",
            Outcome::Passed,
            Duration::from_millis(4),
        ));
        run.results.push(ScenarioResult::new(
            "sorts by ascending order",
            "Table sort test",
            Outcome::Failed(AssertionFailure {
                description: "amounts ascending".to_string(),
                expected: "ascending".to_string(),
                actual: "1250 before 952.23".to_string(),
            }),
            Duration::from_millis(9),
        ));
        run
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_default_reporter() {
            let reporter = ProgressReporter::default();
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_messages() {
            let reporter = ProgressReporter::new(false, false);
            reporter.header("Hackathon");
            reporter.success("passed");
            reporter.failure("failed");
            reporter.warning("warning");
            reporter.info("info");
        }

        #[test]
        fn test_scenario_lines() {
            let reporter = ProgressReporter::new(false, false);
            for result in &sample_run().results {
                reporter.scenario(result);
            }
            reporter.scenario(&ScenarioResult::new(
                "chart data is correct",
                "Canvas chart test",
                Outcome::Errored(StepError {
                    kind: "Snapshot".to_string(),
                    step: "snapshot expenses-chart".to_string(),
                    message: "screenshot is empty".to_string(),
                }),
                Duration::from_millis(2),
            ));
        }

        #[test]
        fn test_progress_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(2, "Running scenarios");
            for result in &sample_run().results {
                reporter.scenario(result);
            }
            reporter.finish();
            reporter.summary(&sample_run());
        }

        #[test]
        fn test_quiet_mode_suppresses_output() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running scenarios");
            assert!(reporter.progress_bar.is_none());
            reporter.success("hidden");
            reporter.header("hidden");
            reporter.failure("shown");
            reporter.summary(&sample_run());
        }
    }
}
