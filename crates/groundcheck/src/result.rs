//! Result and error types for Groundcheck.

use thiserror::Error;

/// Result type for Groundcheck operations
pub type GroundcheckResult<T> = Result<T, GroundcheckError>;

/// Errors that can occur while resolving objects or running scenarios.
///
/// None of these are recovered: each one aborts the current scenario and is
/// reported as a failed test case.
#[derive(Debug, Error)]
pub enum GroundcheckError {
    /// No live widget matches the object map entry
    #[error("Object '{name}' not found: {detail}")]
    ObjectNotFound {
        /// Symbolic name of the entry
        name: String,
        /// What was searched for
        detail: String,
    },

    /// More than one widget matches and the entry has no `occurrence`
    #[error("Object '{name}' is ambiguous: {count} widgets match and no occurrence is given")]
    AmbiguousMatch {
        /// Symbolic name of the entry
        name: String,
        /// Number of matching widgets
        count: usize,
    },

    /// A wait did not succeed within its bound
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the awaited condition (including the last failure)
        what: String,
    },

    /// An observed property differs from the expected literal
    #[error("Assertion failed for '{object}.{property}': expected {expected}, got {actual}")]
    AssertionMismatch {
        /// Symbolic name of the asserted object
        object: String,
        /// Property that was compared
        property: String,
        /// Expected literal
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Symbolic name missing from the object map
    #[error("Unknown object map name '{0}'")]
    UnknownObject(String),

    /// Object map failed validation
    #[error("Invalid object map: {message}")]
    InvalidObjectMap {
        /// Error message
        message: String,
    },

    /// Scenario failed validation
    #[error("Invalid scenario '{scenario}': {message}")]
    InvalidScenario {
        /// Scenario name
        scenario: String,
        /// Error message
        message: String,
    },

    /// Property name not readable from a widget
    #[error("Unsupported widget property '{0}'")]
    UnsupportedProperty(String),

    /// Input event could not be delivered
    #[error("Input rejected by '{object}': {message}")]
    InputRejected {
        /// Symbolic name of the target object
        object: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GroundcheckError {
    /// Create an invalid object map error
    #[must_use]
    pub fn invalid_map(message: impl Into<String>) -> Self {
        Self::InvalidObjectMap {
            message: message.into(),
        }
    }

    /// Create an invalid scenario error
    #[must_use]
    pub fn invalid_scenario(scenario: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidScenario {
            scenario: scenario.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether a lookup failure may go away by waiting.
    ///
    /// Ambiguity is a defect of the object map, not a transient state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ObjectNotFound { .. })
    }
}
