//! Common time helpers for acprio_core.

use std::time::{Duration, Instant};

/// Tick period for a cadence in milliseconds, clamped to at least 1 ms.
#[inline]
pub fn tick_period(tick_ms: u64) -> Duration {
    Duration::from_millis(tick_ms.max(1))
}

/// Next tick deadline after `prev`, and whether the tick that just ran overran it.
///
/// Deadlines advance on a fixed grid so a slow tick does not shift the cadence.
/// When `now` is already past the next grid point, the grid restarts at `now + period`
/// instead of firing a burst of catch-up ticks.
#[inline]
pub fn next_deadline(prev: Instant, now: Instant, period: Duration) -> (Instant, bool) {
    let next = prev + period;
    if now >= next {
        (now + period, true)
    } else {
        (next, false)
    }
}
