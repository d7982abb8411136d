//! Capped exponential backoff
//!
//! Produces the wait before poll round `n` as `initial * factor^n`, never
//! exceeding `max`. With `initial = 2s`, `factor = 2` and `max = 10s` the
//! schedule is 2s, 4s, 8s, 10s, 10s, ...

use std::time::Duration;

/// Backoff schedule for polling loops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    initial: Duration,
    factor: u32,
    max: Duration,
}

impl Backoff {
    /// Exponential backoff starting at `initial`, multiplied by `factor` each
    /// round and capped at `max`.
    #[must_use]
    pub fn capped_exponential(initial: Duration, factor: u32, max: Duration) -> Self {
        Self { initial, factor: factor.max(1), max: max.max(initial) }
    }

    /// Delay before round `attempt` (zero-based)
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        self.factor
            .checked_pow(attempt)
            .map_or(self.max, |multiplier| self.initial.saturating_mul(multiplier).min(self.max))
    }

    /// Iterator over the successive delays (unbounded)
    pub fn delays(self) -> impl Iterator<Item = Duration> {
        (0u32..).map(move |attempt| self.delay(attempt))
    }

    /// First delay of the schedule
    #[must_use]
    pub fn initial(&self) -> Duration {
        self.initial
    }

    /// Upper bound on any single delay
    #[must_use]
    pub fn max(&self) -> Duration {
        self.max
    }
}
