//! Fixture datasets for data-driven scenarios.
//!
//! A dataset is a named, ordered list of [`FixtureRow`]s. Datasets live on
//! disk as `<dir>/<name>.json`, `<name>.yaml` or `<name>.yml` (first existing
//! wins) or are registered in memory with [`FixtureLoader::register`].
//!
//! ```text
//! fixtures/login.json
//! [
//!   { "username": "", "password": "", "isLoggedIn": false,
//!     "errorMessage": "Both Username and Password must be present" },
//!   { "username": "Bruce", "password": "Wayne", "isLoggedIn": true }
//! ]
//! ```
//!
//! Rows are validated field by field before deserialization so a bad row is
//! reported as [`EnsayoError::FixtureMalformed`] with its index, never as a
//! bare serde error.

use crate::result::{EnsayoError, EnsayoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// One parameterized login record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureRow {
    /// Username to type (may be empty)
    pub username: String,
    /// Password to type (may be empty)
    pub password: String,
    /// Whether the row is expected to log in
    pub is_logged_in: bool,
    /// Expected error text when `is_logged_in` is false
    #[serde(default)]
    pub error_message: String,
}

impl FixtureRow {
    /// Row expected to be rejected with `error_message`
    #[must_use]
    pub fn rejected(
        username: impl Into<String>,
        password: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_logged_in: false,
            error_message: error_message.into(),
        }
    }

    /// Row expected to log in
    #[must_use]
    pub fn accepted(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            is_logged_in: true,
            error_message: String::new(),
        }
    }
}

/// Loads named fixture datasets
#[derive(Debug, Clone, Default)]
pub struct FixtureLoader {
    dir: Option<PathBuf>,
    registered: HashMap<String, Vec<FixtureRow>>,
}

impl FixtureLoader {
    /// Loader reading datasets from `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            registered: HashMap::new(),
        }
    }

    /// Loader with no directory; only registered datasets resolve
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Register an in-memory dataset (takes precedence over files)
    pub fn register(&mut self, name: impl Into<String>, rows: Vec<FixtureRow>) {
        let _ = self.registered.insert(name.into(), rows);
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with_dataset(mut self, name: impl Into<String>, rows: Vec<FixtureRow>) -> Self {
        self.register(name, rows);
        self
    }

    /// Directory searched for dataset files
    #[must_use]
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load the named dataset.
    ///
    /// # Errors
    ///
    /// Returns [`EnsayoError::FixtureNotFound`] when no dataset by that name
    /// exists and [`EnsayoError::FixtureMalformed`] when a row is missing a
    /// required field or has a field of the wrong type.
    pub fn load_fixture(&self, name: &str) -> EnsayoResult<Vec<FixtureRow>> {
        if let Some(rows) = self.registered.get(name) {
            tracing::debug!(fixture = name, rows = rows.len(), "using registered fixture");
            return Ok(rows.clone());
        }

        let Some(path) = self.resolve(name) else {
            return Err(EnsayoError::FixtureNotFound {
                name: name.to_string(),
                searched: self.searched_description(name),
            });
        };

        let content = std::fs::read_to_string(&path)?;
        let document: Value = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml_ng::from_str(&content)?
        };
        let rows = parse_rows(name, document)?;
        tracing::info!(fixture = name, path = %path.display(), rows = rows.len(), "loaded fixture");
        Ok(rows)
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{name}.{ext}")))
            .find(|p| p.is_file())
    }

    fn searched_description(&self, name: &str) -> String {
        self.dir.as_ref().map_or_else(
            || "registered datasets".to_string(),
            |dir| format!("{}/{name}.{{json,yaml,yml}}", dir.display()),
        )
    }
}

/// Validate and convert a parsed document into rows
fn parse_rows(name: &str, document: Value) -> EnsayoResult<Vec<FixtureRow>> {
    let Value::Array(items) = document else {
        return Err(EnsayoError::FixtureMalformed {
            name: name.to_string(),
            row: 0,
            message: "dataset must be a sequence of rows".to_string(),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(row, item)| {
            let malformed = |message: String| EnsayoError::FixtureMalformed {
                name: name.to_string(),
                row,
                message,
            };
            check_row(&item).map_err(malformed)?;
            serde_json::from_value(item).map_err(|e| malformed(e.to_string()))
        })
        .collect()
}

fn check_row(item: &Value) -> Result<(), String> {
    let Value::Object(map) = item else {
        return Err("row must be a mapping".to_string());
    };

    for field in ["username", "password"] {
        match map.get(field) {
            Some(Value::String(_)) => {}
            Some(other) => return Err(format!("field '{field}' must be a string, got {other}")),
            None => return Err(format!("missing field '{field}'")),
        }
    }

    let logged_in = match map.get("isLoggedIn") {
        Some(Value::Bool(b)) => *b,
        Some(other) => return Err(format!("field 'isLoggedIn' must be a boolean, got {other}")),
        None => return Err("missing field 'isLoggedIn'".to_string()),
    };

    match map.get("errorMessage") {
        Some(Value::String(msg)) if !logged_in && msg.trim().is_empty() => {
            Err("field 'errorMessage' must not be empty when isLoggedIn is false".to_string())
        }
        Some(Value::String(_)) => Ok(()),
        None if logged_in => Ok(()),
        Some(other) => Err(format!("field 'errorMessage' must be a string, got {other}")),
        None => Err("missing field 'errorMessage' (required when isLoggedIn is false)".to_string()),
    }
}
