use std::time::Duration;

/// Delay before the next attempt after `failures` consecutive failures.
///
/// No failures: the plain interval. Each failure doubles it, capped at
/// `max` (and never below `interval`).
pub fn backoff_delay(interval: Duration, failures: u32, max: Duration) -> Duration {
    if failures == 0 {
        return interval;
    }
    let factor = 1u32.checked_shl(failures.min(31)).unwrap_or(u32::MAX);
    interval.saturating_mul(factor).min(max.max(interval))
}
