//! Login form page object and data-driven expansion.
//!
//! Each [`FixtureRow`] becomes one [`Scenario`]:
//!
//! ```text
//! row {username, password, isLoggedIn, errorMessage}
//!   actions:    type username   (skipped when empty)
//!               type password   (skipped when empty)
//!               click submit
//!   assertions: isLoggedIn=false → error exists, error text contains errorMessage
//!               isLoggedIn=true  → logged-in indicator exists, error absent
//! ```

use crate::fixture::FixtureRow;
use crate::scenario::{Action, Assertion, Scenario};
use serde::{Deserialize, Serialize};

/// Selectors of a login form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    /// Username input
    pub username: String,
    /// Password input
    pub password: String,
    /// Submit control
    pub submit: String,
    /// Error indicator shown on rejected logins
    pub error: String,
    /// Indicator present once logged in
    pub logged_in: String,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: "#username".to_string(),
            password: "#password".to_string(),
            submit: "button#log-in".to_string(),
            error: ".alert-warning".to_string(),
            logged_in: ".top-menu-controls > .logged-user-w > .logged-user-i > .avatar-w > img"
                .to_string(),
        }
    }
}

impl LoginForm {
    /// Actions filling and submitting the form.
    ///
    /// Empty values are not typed; the submit control is always clicked.
    #[must_use]
    pub fn fill_and_submit(&self, username: &str, password: &str) -> Vec<Action> {
        let mut actions = Vec::with_capacity(3);
        if !username.is_empty() {
            actions.push(Action::type_text(&self.username, username));
        }
        if !password.is_empty() {
            actions.push(Action::type_text(&self.password, password));
        }
        actions.push(Action::click(&self.submit));
        actions
    }

    /// Assertions for the expected result of a login attempt
    #[must_use]
    pub fn expectations(&self, row: &FixtureRow) -> Vec<Assertion> {
        if row.is_logged_in {
            vec![
                Assertion::exists(&self.logged_in),
                Assertion::not_exists(&self.error),
            ]
        } else {
            vec![
                Assertion::exists(&self.error),
                Assertion::text_contains(&self.error, &row.error_message),
            ]
        }
    }

    /// Scenario for one fixture row
    #[must_use]
    pub fn scenario_for(&self, row: &FixtureRow, setup: &[Action]) -> Scenario {
        Scenario {
            name: describe_row(row),
            group: String::new(),
            setup: setup.to_vec(),
            actions: self.fill_and_submit(&row.username, &row.password),
            assertions: self.expectations(row),
        }
    }
}

/// Description embedding the row's credentials
#[must_use]
pub fn describe_row(row: &FixtureRow) -> String {
    format!(
        "Login with username: \"{}\" and password: \"{}\".",
        row.username, row.password
    )
}

/// Expand fixture rows into one scenario per row, in row order
#[must_use]
pub fn expand_login(rows: &[FixtureRow], form: &LoginForm, setup: &[Action]) -> Vec<Scenario> {
    rows.iter().map(|row| form.scenario_for(row, setup)).collect()
}
