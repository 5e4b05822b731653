//! Scenario model: actions, assertions and the registry.
//!
//! Scenarios are plain data. They are built by hand, expanded from fixture
//! rows, or deserialized from a suite file; one generic runner interprets all
//! of them. Registering a scenario has no side effects.

use crate::driver::Viewport;
use serde::{Deserialize, Serialize};

const fn default_strict() -> bool {
    true
}

/// A simulated user interaction against the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Navigate to URL (resets page state)
    #[serde(rename = "navigate")]
    Navigate {
        /// Absolute target URL
        url: String,
    },
    /// Resize the viewport
    #[serde(rename = "set_viewport")]
    SetViewport {
        /// Width in CSS pixels
        width: u32,
        /// Height in CSS pixels
        height: u32,
    },
    /// Type text into an element
    #[serde(rename = "type")]
    Type {
        /// Target element
        selector: String,
        /// Text to type, never empty
        text: String,
    },
    /// Click on an element
    #[serde(rename = "click")]
    Click {
        /// Target element
        selector: String,
    },
    /// Wait until an element is present
    #[serde(rename = "wait_for")]
    WaitFor {
        /// Element to wait for
        selector: String,
        /// Overrides the step timeout
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    /// Sleep; defaults to the runner's settle delay
    #[serde(rename = "pause")]
    Pause {
        /// Pause length in milliseconds
        #[serde(default)]
        ms: Option<u64>,
    },
    /// Record the text of every match of `selector` under `into`
    #[serde(rename = "capture_texts")]
    CaptureTexts {
        /// Elements to read
        selector: String,
        /// Capture name, referenced by `same_texts_as`
        into: String,
    },
}

impl Action {
    /// Navigate action
    #[must_use]
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::Navigate { url: url.into() }
    }

    /// Viewport action
    #[must_use]
    pub const fn set_viewport(viewport: Viewport) -> Self {
        Self::SetViewport {
            width: viewport.width,
            height: viewport.height,
        }
    }

    /// Type action
    #[must_use]
    pub fn type_text(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Type {
            selector: selector.into(),
            text: text.into(),
        }
    }

    /// Click action
    #[must_use]
    pub fn click(selector: impl Into<String>) -> Self {
        Self::Click {
            selector: selector.into(),
        }
    }

    /// Human-readable description used in logs and error reports
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Navigate { url } => format!("navigate to {url}"),
            Self::SetViewport { width, height } => format!("set viewport {width}x{height}"),
            Self::Type { selector, text } => format!("type \"{text}\" into {selector}"),
            Self::Click { selector } => format!("click {selector}"),
            Self::WaitFor { selector, .. } => format!("wait for {selector}"),
            Self::Pause { ms: Some(ms) } => format!("pause {ms}ms"),
            Self::Pause { ms: None } => "pause".to_string(),
            Self::CaptureTexts { selector, into } => format!("capture texts of {selector} as '{into}'"),
        }
    }
}

/// A post-condition check against observed UI state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Assertion {
    /// Element is present (absence is a failure, not an error)
    #[serde(rename = "exists")]
    Exists {
        /// Element that must match
        selector: String,
    },
    /// Element is absent
    #[serde(rename = "not_exists")]
    NotExists {
        /// Element that must not match
        selector: String,
    },
    /// Trimmed text equals `expected`
    #[serde(rename = "text_equals")]
    TextEquals {
        /// Element to read
        selector: String,
        /// Exact text after trimming
        expected: String,
    },
    /// Text contains `expected`
    #[serde(rename = "text_contains")]
    TextContains {
        /// Element to read
        selector: String,
        /// Required substring
        expected: String,
    },
    /// Attribute equals `expected`
    #[serde(rename = "attribute_equals")]
    AttributeEquals {
        /// Element to read
        selector: String,
        /// Attribute name
        attribute: String,
        /// Exact attribute value
        expected: String,
    },
    /// Attribute contains `expected`
    #[serde(rename = "attribute_contains")]
    AttributeContains {
        /// Element to read
        selector: String,
        /// Attribute name
        attribute: String,
        /// Required substring
        expected: String,
    },
    /// Element is enabled
    #[serde(rename = "enabled")]
    Enabled {
        /// Element to check
        selector: String,
    },
    /// Element checked state equals `expected`
    #[serde(rename = "checked")]
    Checked {
        /// Checkbox or radio
        selector: String,
        /// Wanted state
        expected: bool,
    },
    /// Amounts of every match are ascending
    #[serde(rename = "ascending_amounts")]
    AscendingAmounts {
        /// Cells holding amounts, in display order
        selector: String,
        /// Reject equal neighbours
        #[serde(default = "default_strict")]
        strict: bool,
    },
    /// Texts of every match are a permutation of a capture
    #[serde(rename = "same_texts_as")]
    SameTextsAs {
        /// Elements to read now
        selector: String,
        /// Name given to an earlier `capture_texts`
        captured: String,
    },
    /// Element screenshot matches the named visual snapshot
    #[serde(rename = "visual_snapshot")]
    VisualSnapshot {
        /// Element to capture
        selector: String,
        /// Baseline name
        name: String,
    },
}

impl Assertion {
    /// Exists assertion
    #[must_use]
    pub fn exists(selector: impl Into<String>) -> Self {
        Self::Exists {
            selector: selector.into(),
        }
    }

    /// Not-exists assertion
    #[must_use]
    pub fn not_exists(selector: impl Into<String>) -> Self {
        Self::NotExists {
            selector: selector.into(),
        }
    }

    /// Text-contains assertion
    #[must_use]
    pub fn text_contains(selector: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TextContains {
            selector: selector.into(),
            expected: expected.into(),
        }
    }

    /// Text-equals assertion
    #[must_use]
    pub fn text_equals(selector: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TextEquals {
            selector: selector.into(),
            expected: expected.into(),
        }
    }

    /// Selector the assertion targets
    #[must_use]
    pub fn selector(&self) -> &str {
        match self {
            Self::Exists { selector }
            | Self::NotExists { selector }
            | Self::TextEquals { selector, .. }
            | Self::TextContains { selector, .. }
            | Self::AttributeEquals { selector, .. }
            | Self::AttributeContains { selector, .. }
            | Self::Enabled { selector }
            | Self::Checked { selector, .. }
            | Self::AscendingAmounts { selector, .. }
            | Self::SameTextsAs { selector, .. }
            | Self::VisualSnapshot { selector, .. } => selector,
        }
    }

    /// Human-readable description used in failure reports
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Exists { selector } => format!("{selector} exists"),
            Self::NotExists { selector } => format!("{selector} does not exist"),
            Self::TextEquals { selector, .. } => format!("text of {selector}"),
            Self::TextContains { selector, .. } => format!("text of {selector} contains"),
            Self::AttributeEquals {
                selector,
                attribute,
                ..
            } => format!("{attribute} of {selector}"),
            Self::AttributeContains {
                selector,
                attribute,
                ..
            } => format!("{attribute} of {selector} contains"),
            Self::Enabled { selector } => format!("{selector} is enabled"),
            Self::Checked { selector, .. } => format!("checked state of {selector}"),
            Self::AscendingAmounts { selector, strict } => {
                let order = if *strict { "strictly ascending" } else { "ascending" };
                format!("amounts of {selector} are {order}")
            }
            Self::SameTextsAs { selector, captured } => {
                format!("texts of {selector} are a permutation of '{captured}'")
            }
            Self::VisualSnapshot { name, .. } => format!("visual snapshot '{name}'"),
        }
    }
}

/// One declarative end-to-end case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Description shown in reports
    pub name: String,
    /// Group the scenario belongs to
    #[serde(default)]
    pub group: String,
    /// Setup actions (navigation, viewport, group setup)
    #[serde(default)]
    pub setup: Vec<Action>,
    /// Actions, executed in order
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Assertions, evaluated in order after all actions
    #[serde(default)]
    pub assertions: Vec<Assertion>,
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: String::new(),
            setup: Vec::new(),
            actions: Vec::new(),
            assertions: Vec::new(),
        }
    }

    /// Set group
    #[must_use]
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Set setup actions
    #[must_use]
    pub fn with_setup(mut self, setup: Vec<Action>) -> Self {
        self.setup = setup;
        self
    }

    /// Append an action
    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Append an assertion
    #[must_use]
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Total steps (setup + actions + assertions)
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.setup.len() + self.actions.len() + self.assertions.len()
    }
}

/// Ordered collection of registered scenarios
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioRegistry {
    scenarios: Vec<Scenario>,
}

impl ScenarioRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario from its parts
    pub fn register(
        &mut self,
        name: impl Into<String>,
        setup: Vec<Action>,
        actions: Vec<Action>,
        assertions: Vec<Assertion>,
    ) -> &Scenario {
        self.push(Scenario {
            name: name.into(),
            group: String::new(),
            setup,
            actions,
            assertions,
        })
    }

    /// Register a fully built scenario
    pub fn push(&mut self, scenario: Scenario) -> &Scenario {
        self.scenarios.push(scenario);
        let last = self.scenarios.len() - 1;
        &self.scenarios[last]
    }

    /// Register many scenarios
    pub fn extend(&mut self, scenarios: impl IntoIterator<Item = Scenario>) {
        self.scenarios.extend(scenarios);
    }

    /// Scenarios in registration order
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Scenarios in the named group
    pub fn in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Scenario> + 'a {
        self.scenarios.iter().filter(move |s| s.group == group)
    }

    /// Keep only scenarios whose name or group contains `pattern`
    #[must_use]
    pub fn filtered(self, pattern: &str) -> Self {
        Self {
            scenarios: self
                .scenarios
                .into_iter()
                .filter(|s| s.name.contains(pattern) || s.group.contains(pattern))
                .collect(),
        }
    }

    /// Number of scenarios
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Consume into the scenario list
    #[must_use]
    pub fn into_scenarios(self) -> Vec<Scenario> {
        self.scenarios
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod action_tests {
        use super::*;

        #[test]
        fn test_action_yaml_tags() {
            let yaml = r##"
- type: navigate
  url: "https://demo.applitools.com/hackathon.html"
- type: type
  selector: "#username"
  text: Bruce
- type: click
  selector: "button#log-in"
- type: pause
- type: wait_for
  selector: "#canvas"
  timeout_ms: 2000
- type: capture_texts
  selector: "#transactionsTable tbody tr"
  into: rows
"##;
            let actions: Vec<Action> = serde_yaml_ng::from_str(yaml).unwrap();
            assert_eq!(actions.len(), 6);
            assert_eq!(actions[1], Action::type_text("#username", "Bruce"));
            assert_eq!(actions[3], Action::Pause { ms: None });
            assert!(matches!(actions[4], Action::WaitFor { timeout_ms: Some(2000), .. }));
        }

        #[test]
        fn test_action_describe() {
            assert_eq!(Action::click("#amount").describe(), "click #amount");
            assert_eq!(
                Action::set_viewport(Viewport::new(1800, 1000)).describe(),
                "set viewport 1800x1000"
            );
        }

        #[test]
        fn test_unknown_action_rejected() {
            let result: Result<Action, _> = serde_yaml_ng::from_str("type: hover\nselector: a");
            assert!(result.is_err());
        }
    }

    mod assertion_tests {
        use super::*;

        #[test]
        fn test_ascending_defaults_strict() {
            let a: Assertion =
                serde_yaml_ng::from_str("type: ascending_amounts\nselector: td").unwrap();
            assert_eq!(
                a,
                Assertion::AscendingAmounts {
                    selector: "td".to_string(),
                    strict: true
                }
            );
        }

        #[test]
        fn test_attribute_assertion_yaml() {
            let yaml = "type: attribute_contains\nselector: \"#username\"\nattribute: placeholder\nexpected: Enter your username";
            let a: Assertion = serde_yaml_ng::from_str(yaml).unwrap();
            assert_eq!(a.selector(), "#username");
            assert_eq!(a.describe(), "placeholder of #username contains");
        }
    }

    mod registry_tests {
        use super::*;

        #[test]
        fn test_register_preserves_order() {
            let mut registry = ScenarioRegistry::new();
            let _ = registry.register("first", vec![], vec![], vec![]);
            let second = registry.register(
                "second",
                vec![Action::navigate("about:blank")],
                vec![Action::click("#a")],
                vec![Assertion::exists("#b")],
            );
            assert_eq!(second.step_count(), 3);

            let names: Vec<_> = registry.scenarios().iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, ["first", "second"]);
        }

        #[test]
        fn test_group_and_filter() {
            let mut registry = ScenarioRegistry::new();
            registry.extend([
                Scenario::new("sorts amounts").in_group("Table sort test"),
                Scenario::new("shows ads").in_group("Dynamic content"),
            ]);
            assert_eq!(registry.in_group("Dynamic content").count(), 1);

            let filtered = registry.filtered("sort");
            assert_eq!(filtered.len(), 1);
            assert_eq!(filtered.scenarios()[0].name, "sorts amounts");
        }

        #[test]
        fn test_builder() {
            let s = Scenario::new("login")
                .with_setup(vec![Action::navigate("about:blank")])
                .action(Action::click("button#log-in"))
                .assert(Assertion::exists(".alert-warning"));
            assert_eq!(s.setup.len(), 1);
            assert_eq!(s.actions.len(), 1);
            assert_eq!(s.assertions.len(), 1);
        }
    }
}
