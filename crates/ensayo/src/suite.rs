//! Suite YAML schema and expansion into a scenario registry.
//!
//! A suite names a page, a viewport and a list of groups. Each group is
//! either hand-written scenarios or a data-driven login block fed by a
//! fixture dataset. Every expanded scenario begins with the same setup:
//! navigate to the group's page, size the viewport, then run the group's
//! own setup actions. The page is therefore reset before each case.

use crate::driver::Viewport;
use crate::fixture::FixtureLoader;
use crate::login::{expand_login, LoginForm};
use crate::result::{EnsayoError, EnsayoResult};
use crate::scenario::{Action, Assertion, Scenario, ScenarioRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Supported schema version
pub const SUITE_VERSION: &str = "1.0";

/// Root suite document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSpec {
    /// Schema version (must be "1.0")
    pub version: String,
    /// Suite name
    pub name: String,
    /// Suite description
    #[serde(default)]
    pub description: String,
    /// Page every group navigates to unless it overrides `url`
    pub base_url: String,
    /// Viewport applied before each scenario
    #[serde(default)]
    pub viewport: Option<Viewport>,
    /// Scenario groups, in order
    pub groups: Vec<GroupSpec>,
}

/// A named set of scenarios sharing a page and setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Group name
    pub name: String,
    /// Absolute URL, or `?query` / relative path resolved against `base_url`
    #[serde(default)]
    pub url: Option<String>,
    /// Actions run after navigation, before each scenario
    #[serde(default)]
    pub setup: Vec<Action>,
    /// Hand-written scenarios
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
    /// Data-driven login block
    #[serde(default)]
    pub data_driven: Option<DataDrivenSpec>,
}

/// Hand-written scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Description
    pub name: String,
    /// Actions
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Assertions
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

/// Fixture-driven login block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDrivenSpec {
    /// Fixture dataset name
    pub fixture: String,
    /// Login form selectors
    #[serde(default)]
    pub form: LoginForm,
}

impl SuiteSpec {
    /// Parse and validate a suite from YAML.
    ///
    /// # Errors
    /// Returns error if YAML is invalid or validation fails.
    pub fn from_yaml(yaml: &str) -> EnsayoResult<Self> {
        let suite: Self = serde_yaml_ng::from_str(yaml)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Read, parse and validate a suite file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> EnsayoResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let suite = Self::from_yaml(&content)?;
        tracing::debug!(suite = %suite.name, path = %path.display(), "loaded suite");
        Ok(suite)
    }

    /// Validate the suite structure.
    ///
    /// # Errors
    /// Returns [`EnsayoError::SuiteInvalid`] describing the first problem.
    pub fn validate(&self) -> EnsayoResult<()> {
        if self.version != SUITE_VERSION {
            return Err(EnsayoError::suite_invalid(format!(
                "unsupported version '{}', expected '{SUITE_VERSION}'",
                self.version
            )));
        }
        let base = parse_base_url(&self.base_url)?;
        if self.groups.is_empty() {
            return Err(EnsayoError::suite_invalid("suite has no groups"));
        }
        if let Some(viewport) = self.viewport {
            if viewport.width == 0 || viewport.height == 0 {
                return Err(EnsayoError::suite_invalid("viewport must be non-zero"));
            }
        }

        let mut names = HashSet::new();
        for group in &self.groups {
            if !names.insert(group.name.as_str()) {
                return Err(EnsayoError::suite_invalid(format!(
                    "duplicate group '{}'",
                    group.name
                )));
            }
            if let Some(url) = group.url.as_deref() {
                let _ = join_url(&base, &group.name, url)?;
            }
            if group.scenarios.is_empty() && group.data_driven.is_none() {
                return Err(EnsayoError::suite_invalid(format!(
                    "group '{}' has neither scenarios nor data_driven",
                    group.name
                )));
            }
            for scenario in &group.scenarios {
                validate_scenario(&group.name, &group.setup, scenario)?;
            }
        }
        Ok(())
    }

    /// Replace the base URL (e.g. to target a staging copy of the page)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// URL a group navigates to: its own `url` joined onto `base_url`.
    ///
    /// # Errors
    /// Returns [`EnsayoError::SuiteInvalid`] if either URL does not parse.
    pub fn group_url(&self, group: &GroupSpec) -> EnsayoResult<String> {
        let Some(url) = group.url.as_deref() else {
            return Ok(self.base_url.trim().to_string());
        };
        let base = parse_base_url(&self.base_url)?;
        Ok(join_url(&base, &group.name, url)?.into())
    }

    /// Count of hand-written scenarios (data-driven groups are counted on expansion)
    #[must_use]
    pub fn static_scenario_count(&self) -> usize {
        self.groups.iter().map(|g| g.scenarios.len()).sum()
    }

    /// Expand every group into a registry, loading fixtures as needed.
    ///
    /// # Errors
    /// Returns fixture errors; these abort the whole run.
    pub fn expand(
        &self,
        fixtures: &FixtureLoader,
        default_viewport: Viewport,
    ) -> EnsayoResult<ScenarioRegistry> {
        let viewport = self.viewport.unwrap_or(default_viewport);
        let mut registry = ScenarioRegistry::new();

        for group in &self.groups {
            let mut setup = vec![
                Action::navigate(self.group_url(group)?),
                Action::set_viewport(viewport),
            ];
            setup.extend(group.setup.iter().cloned());

            if let Some(data_driven) = &group.data_driven {
                let rows = fixtures.load_fixture(&data_driven.fixture)?;
                registry.extend(
                    expand_login(&rows, &data_driven.form, &setup)
                        .into_iter()
                        .map(|s| s.in_group(&group.name)),
                );
            }

            registry.extend(group.scenarios.iter().map(|spec| Scenario {
                name: spec.name.clone(),
                group: group.name.clone(),
                setup: setup.clone(),
                actions: spec.actions.clone(),
                assertions: spec.assertions.clone(),
            }));
        }

        tracing::info!(suite = %self.name, scenarios = registry.len(), "expanded suite");
        Ok(registry)
    }
}

fn validate_scenario(group: &str, setup: &[Action], scenario: &ScenarioSpec) -> EnsayoResult<()> {
    if scenario.name.trim().is_empty() {
        return Err(EnsayoError::suite_invalid(format!(
            "group '{group}' has a scenario without a name"
        )));
    }
    if scenario.actions.is_empty() && scenario.assertions.is_empty() {
        return Err(EnsayoError::suite_invalid(format!(
            "scenario '{}' has no actions or assertions",
            scenario.name
        )));
    }

    let captures: HashSet<&str> = setup
        .iter()
        .chain(&scenario.actions)
        .filter_map(|a| match a {
            Action::CaptureTexts { into, .. } => Some(into.as_str()),
            _ => None,
        })
        .collect();
    for assertion in &scenario.assertions {
        if let Assertion::SameTextsAs { captured, .. } = assertion {
            if !captures.contains(captured.as_str()) {
                return Err(EnsayoError::suite_invalid(format!(
                    "scenario '{}' compares against unknown capture '{captured}'",
                    scenario.name
                )));
            }
        }
    }
    Ok(())
}

fn parse_base_url(base_url: &str) -> EnsayoResult<Url> {
    Url::parse(base_url.trim()).map_err(|e| {
        EnsayoError::suite_invalid(format!("invalid base_url '{base_url}': {e}"))
    })
}

fn join_url(base: &Url, group: &str, url: &str) -> EnsayoResult<Url> {
    base.join(url.trim()).map_err(|e| {
        EnsayoError::suite_invalid(format!("group '{group}' has invalid url '{url}': {e}"))
    })
}
