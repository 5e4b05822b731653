//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Suite could not be loaded or expanded
    #[error("Suite error: {0}")]
    Suite(#[from] ensayo::EnsayoError),

    /// Suite ran but not every scenario passed
    #[error("{failed} of {total} scenarios did not pass")]
    ScenariosFailed {
        /// Failed plus errored scenarios
        failed: usize,
        /// Scenarios executed
        total: usize,
    },

    /// Run stopped by Ctrl-C before every scenario started
    #[error("interrupted after {completed} scenarios")]
    Interrupted {
        /// Scenarios that produced a result
        completed: usize,
    },

    /// Command needs a feature this binary was built without
    #[error("'{command}' requires the '{feature}' feature. Rebuild with --features {feature}")]
    FeatureDisabled {
        /// Subcommand name
        command: String,
        /// Cargo feature name
        feature: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a missing-feature error
    #[must_use]
    pub fn feature_disabled(command: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::FeatureDisabled {
            command: command.into(),
            feature: feature.into(),
        }
    }
}
