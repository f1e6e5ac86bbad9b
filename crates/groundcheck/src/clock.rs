//! Deterministic simulated time.
//!
//! The simulated GCS never sleeps: waiting advances this clock and the
//! simulation catches up tick by tick, so a twenty second wait costs
//! microseconds and always produces the same result.

use std::time::Duration;

/// Default simulation tick (250ms, the telemetry update period)
pub const DEFAULT_TICK_MS: u64 = 250;

/// Monotonic clock advanced explicitly in fixed ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedClock {
    /// Current time in milliseconds since start
    now_ms: u64,
    /// Tick length in milliseconds
    tick_ms: u64,
    /// Time of the last completed tick
    last_tick_ms: u64,
}

impl SimulatedClock {
    /// Create a clock at time zero with the given tick length.
    ///
    /// A zero tick is bumped to one millisecond.
    #[must_use]
    pub const fn new(tick_ms: u64) -> Self {
        Self {
            now_ms: 0,
            tick_ms: if tick_ms == 0 { 1 } else { tick_ms },
            last_tick_ms: 0,
        }
    }

    /// Current simulated time
    #[must_use]
    pub const fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }

    /// Current simulated time in milliseconds
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Tick length in milliseconds
    #[must_use]
    pub const fn tick_ms(&self) -> u64 {
        self.tick_ms
    }

    /// Advance the clock and return how many whole ticks elapsed.
    ///
    /// Partial ticks carry over to the next call.
    pub fn advance(&mut self, duration: Duration) -> u64 {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.now_ms = self.now_ms.saturating_add(ms);
        let ticks = (self.now_ms - self.last_tick_ms) / self.tick_ms;
        self.last_tick_ms += ticks * self.tick_ms;
        ticks
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_MS)
    }
}
