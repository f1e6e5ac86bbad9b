//! Harness configuration.
//!
//! ```yaml
//! wait_timeout_ms: 20000
//! poll_interval_ms: 50
//! wait_policy: poll
//! seed: 42
//! tick_ms: 250
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::clock::DEFAULT_TICK_MS;
use crate::result::{GroundcheckError, GroundcheckResult};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Default simulation seed
pub const DEFAULT_SEED: u64 = 42;

/// How `wait` steps are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitPolicy {
    /// Poll `until` conditions; pause only for waits without one
    #[default]
    Poll,
    /// Pause for exactly the recorded duration
    Recorded,
}

impl fmt::Display for WaitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Poll => write!(f, "poll"),
            Self::Recorded => write!(f, "recorded"),
        }
    }
}

impl FromStr for WaitPolicy {
    type Err = GroundcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "poll" => Ok(Self::Poll),
            "recorded" => Ok(Self::Recorded),
            other => Err(GroundcheckError::config(format!(
                "unknown wait policy '{other}' (expected poll or recorded)"
            ))),
        }
    }
}

/// Configuration shared by the resolver, executor and simulated GCS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Timeout for object lookups and `until` conditions
    pub wait_timeout_ms: u64,
    /// Interval between polls
    pub poll_interval_ms: u64,
    /// How `wait` steps are executed
    pub wait_policy: WaitPolicy,
    /// Seed for the simulation's random variations
    pub seed: u64,
    /// Simulation tick length
    pub tick_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            wait_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            wait_policy: WaitPolicy::default(),
            seed: DEFAULT_SEED,
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl HarnessConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a configuration from YAML
    pub fn from_yaml(yaml: &str) -> GroundcheckResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> GroundcheckResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Check value ranges
    pub fn validate(&self) -> GroundcheckResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(GroundcheckError::config("poll_interval_ms must be positive"));
        }
        if self.tick_ms == 0 {
            return Err(GroundcheckError::config("tick_ms must be positive"));
        }
        Ok(())
    }

    /// Set the wait timeout
    #[must_use]
    pub const fn with_wait_timeout(mut self, ms: u64) -> Self {
        self.wait_timeout_ms = ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the wait policy
    #[must_use]
    pub const fn with_wait_policy(mut self, policy: WaitPolicy) -> Self {
        self.wait_policy = policy;
        self
    }

    /// Set the simulation seed
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the simulation tick
    #[must_use]
    pub const fn with_tick(mut self, ms: u64) -> Self {
        self.tick_ms = ms;
        self
    }

    /// Wait options for the resolver
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.wait_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}
