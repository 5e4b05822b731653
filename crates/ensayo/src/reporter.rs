//! Suite run reports: plain text, JSON and JUnit XML.

use crate::outcome::{Outcome, SuiteRun};
use crate::result::EnsayoResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Human-readable summary
    #[default]
    Text,
    /// Pretty-printed JSON of the whole run
    Json,
    /// JUnit XML for CI integration
    Junit,
}

impl ReportFormat {
    /// Render `run` in this format
    ///
    /// # Errors
    /// Returns error if JSON serialization fails
    pub fn render(self, run: &SuiteRun) -> EnsayoResult<String> {
        match self {
            Self::Text => Ok(render_text(run)),
            Self::Json => render_json(run),
            Self::Junit => Ok(render_junit(run)),
        }
    }

    /// Render `run` and write it to `path`
    ///
    /// # Errors
    /// Returns error if rendering or file writing fails
    pub fn write(self, run: &SuiteRun, path: &Path) -> EnsayoResult<()> {
        let content = self.render(run)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Render the plain-text summary.
///
/// One line per scenario; failures add expected vs actual, errors add the
/// step and message.
#[must_use]
pub fn render_text(run: &SuiteRun) -> String {
    let mut out = String::new();
    let mut group = None;

    for result in &run.results {
        if group != Some(result.group.as_str()) && !result.group.is_empty() {
            out.push_str(&format!("{}\n", result.group));
        }
        group = Some(result.group.as_str());

        out.push_str(&format!(
            "  [{}] {} ({}ms)\n",
            result.outcome.label().to_uppercase(),
            result.name,
            result.duration.as_millis()
        ));
        match &result.outcome {
            Outcome::Passed => {}
            Outcome::Failed(failure) => {
                out.push_str(&format!("      {}\n", failure.description));
                out.push_str(&format!("      expected: {}\n", failure.expected));
                out.push_str(&format!("      actual:   {}\n", failure.actual));
            }
            Outcome::Errored(error) => {
                out.push_str(&format!("      {} during '{}'\n", error.kind, error.step));
                out.push_str(&format!("      {}\n", error.message));
            }
        }
    }

    out.push_str(&format!(
        "\n{} in {:.2}s\n",
        run.summary(),
        run.duration.as_secs_f64()
    ));
    out
}

/// Render the run as pretty JSON
///
/// # Errors
/// Returns error if serialization fails
pub fn render_json(run: &SuiteRun) -> EnsayoResult<String> {
    Ok(serde_json::to_string_pretty(run)?)
}

/// Render JUnit XML content
#[must_use]
pub fn render_junit(run: &SuiteRun) -> String {
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(&format!(
        r#"<testsuite name="{}" tests="{}" failures="{}" errors="{}" time="{:.3}" timestamp="{}">"#,
        escape_xml(&run.name),
        run.total_count(),
        run.failed_count(),
        run.errored_count(),
        run.duration.as_secs_f64(),
        run.started_at.to_rfc3339()
    ));
    xml.push('\n');

    for result in &run.results {
        xml.push_str(&format!(
            r#"  <testcase classname="{}" name="{}" time="{:.3}">"#,
            escape_xml(&result.group),
            escape_xml(&result.name),
            result.duration.as_secs_f64()
        ));
        xml.push('\n');

        match &result.outcome {
            Outcome::Passed => {}
            Outcome::Failed(failure) => {
                xml.push_str(&format!(
                    r#"    <failure message="{}">expected: {}{}actual: {}</failure>"#,
                    escape_xml(&failure.description),
                    escape_xml(&failure.expected),
                    "\n",
                    escape_xml(&failure.actual)
                ));
                xml.push('\n');
            }
            Outcome::Errored(error) => {
                xml.push_str(&format!(
                    r#"    <error type="{}" message="{}">{}</error>"#,
                    escape_xml(&error.kind),
                    escape_xml(&error.step),
                    escape_xml(&error.message)
                ));
                xml.push('\n');
            }
        }

        xml.push_str("  </testcase>\n");
    }

    xml.push_str("</testsuite>\n");
    xml
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
