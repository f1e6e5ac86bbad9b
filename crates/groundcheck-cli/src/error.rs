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

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// At least one scenario did not pass
    #[error("{failed} of {total} scenarios did not pass")]
    ScenariosFailed {
        /// Scenarios that failed or were not run
        failed: usize,
        /// Scenarios in the suite
        total: usize,
    },

    /// Object map entries that match several widgets
    #[error("{count} object map entries are ambiguous")]
    AmbiguousEntries {
        /// Number of ambiguous entries
        count: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Groundcheck library error
    #[error("{0}")]
    Groundcheck(#[from] groundcheck::GroundcheckError),
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
}
