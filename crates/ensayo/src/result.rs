//! Result and error types for Ensayo.

use thiserror::Error;

/// Result type for Ensayo operations
pub type EnsayoResult<T> = Result<T, EnsayoError>;

/// Errors that can occur in Ensayo
#[derive(Debug, Error)]
pub enum EnsayoError {
    /// Named fixture dataset does not exist
    #[error("Fixture '{name}' not found in {searched}")]
    FixtureNotFound {
        /// Dataset name
        name: String,
        /// Where the loader looked
        searched: String,
    },

    /// Fixture row is missing a required field or has the wrong shape
    #[error("Fixture '{name}' row {row} is malformed: {message}")]
    FixtureMalformed {
        /// Dataset name
        name: String,
        /// Zero-based row index
        row: usize,
        /// What is wrong with the row
        message: String,
    },

    /// Element absent when required present
    #[error("No element matches '{selector}'")]
    LocatorNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// Value mismatch
    #[error("Assertion failed: {description} (expected {expected}, got {actual})")]
    AssertionFailed {
        /// What was checked
        description: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Step did not complete within its wait interval
    #[error("'{step}' timed out after {ms}ms")]
    ActionTimeout {
        /// Step description
        step: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Action the capability cannot perform
    #[error("Unsupported action: {message}")]
    UnsupportedAction {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Browser capability error
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Snapshot comparator error
    #[error("Snapshot '{name}' failed: {message}")]
    Snapshot {
        /// Snapshot name
        name: String,
        /// Error message
        message: String,
    },

    /// Suite file failed validation
    #[error("Invalid suite: {message}")]
    SuiteInvalid {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl EnsayoError {
    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an unsupported action error
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedAction {
            message: message.into(),
        }
    }

    /// Create a suite validation error
    #[must_use]
    pub fn suite_invalid(message: impl Into<String>) -> Self {
        Self::SuiteInvalid {
            message: message.into(),
        }
    }

    /// Short machine-friendly name of the error kind
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FixtureNotFound { .. } => "FixtureNotFound",
            Self::FixtureMalformed { .. } => "FixtureMalformed",
            Self::LocatorNotFound { .. } => "LocatorNotFound",
            Self::AssertionFailed { .. } => "AssertionFailed",
            Self::ActionTimeout { .. } => "ActionTimeout",
            Self::UnsupportedAction { .. } => "UnsupportedAction",
            Self::Navigation { .. } => "Navigation",
            Self::Driver { .. } => "Driver",
            Self::Snapshot { .. } => "Snapshot",
            Self::SuiteInvalid { .. } => "SuiteInvalid",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::Yaml(_) => "Yaml",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_not_found_message() {
        let err = EnsayoError::FixtureNotFound {
            name: "login".to_string(),
            searched: "fixtures".to_string(),
        };
        assert!(err.to_string().contains("login"));
        assert_eq!(err.kind(), "FixtureNotFound");
    }

    #[test]
    fn test_assertion_failed_shows_expected_and_actual() {
        let err = EnsayoError::AssertionFailed {
            description: "text of .auth-header".to_string(),
            expected: "Login Form".to_string(),
            actual: "Sign in".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Login Form"));
        assert!(msg.contains("Sign in"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: EnsayoError = io_err.into();
        assert_eq!(err.kind(), "Io");
    }

    #[test]
    fn test_helpers() {
        assert_eq!(EnsayoError::driver("x").kind(), "Driver");
        assert_eq!(EnsayoError::unsupported("x").kind(), "UnsupportedAction");
        assert_eq!(EnsayoError::suite_invalid("x").kind(), "SuiteInvalid");
    }
}
