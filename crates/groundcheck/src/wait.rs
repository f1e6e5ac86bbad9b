//! Condition polling with a bounded timeout.
//!
//! Every wait in Groundcheck is "poll until the observable state holds, or
//! fail after the timeout". Fixed pauses exist only for replaying recorded
//! scenarios verbatim.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

use crate::app::Application;
use crate::result::{GroundcheckError, GroundcheckResult};

/// Default timeout for object lookups (20 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 20_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration (never zero)
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(if self.poll_interval_ms == 0 {
            1
        } else {
            self.poll_interval_ms
        })
    }
}

/// Outcome of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// Condition holds
    Ready(T),
    /// Not yet; the reason is reported if the wait times out
    Pending(String),
}

/// Poll `probe` until it is ready, advancing the application between polls.
///
/// The probe is always evaluated at least once, including with a zero
/// timeout. An `Err` from the probe aborts the wait immediately.
pub fn poll_until<A, T, F>(
    app: &mut A,
    options: &WaitOptions,
    what: &str,
    mut probe: F,
) -> GroundcheckResult<T>
where
    A: Application + ?Sized,
    F: FnMut(&A) -> GroundcheckResult<Probe<T>>,
{
    let deadline = app.elapsed() + options.timeout();
    loop {
        let reason = match probe(&*app)? {
            Probe::Ready(value) => return Ok(value),
            Probe::Pending(reason) => reason,
        };
        let now = app.elapsed();
        if now >= deadline {
            return Err(GroundcheckError::Timeout {
                ms: options.timeout_ms,
                what: format!("{what} ({reason})"),
            });
        }
        trace!(what, %reason, elapsed_ms = now.as_millis() as u64, "still waiting");
        app.advance(options.poll_interval().min(deadline - now));
    }
}
