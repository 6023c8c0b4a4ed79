//! Exponential backoff for transient camera failures.

use std::time::Duration;

/// Exponential backoff schedule: `min(base * 2^retries, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay after the first failure.
    pub base: Duration,
    /// Upper bound on any single delay.
    pub cap: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(5),
            cap: Duration::from_secs(600),
        }
    }
}

impl Backoff {
    /// Creates a schedule with the given base and cap.
    #[must_use]
    pub const fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Delay to wait after `retries` earlier failures.
    #[must_use]
    pub fn delay(&self, retries: u32) -> Duration {
        let factor = 1u32.checked_shl(retries).unwrap_or(u32::MAX);
        self.base
            .checked_mul(factor)
            .map_or(self.cap, |delay| delay.min(self.cap))
    }
}

/// Retry counter owned by one run of the monitor loop.
#[derive(Debug)]
pub(crate) struct RetryState {
    backoff: Backoff,
    retries: u32,
}

impl RetryState {
    pub(crate) const fn new(backoff: Backoff) -> Self {
        Self {
            backoff,
            retries: 0,
        }
    }

    /// Returns the delay for the current failure and counts it.
    pub(crate) fn next_delay(&mut self) -> Duration {
        let delay = self.backoff.delay(self.retries);
        self.retries = self.retries.saturating_add(1);
        delay
    }

    pub(crate) const fn retries(&self) -> u32 {
        self.retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_secs).collect()
    }

    #[test]
    fn test_default_sequence() {
        let backoff = Backoff::default();
        let delays: Vec<_> = (0..10).map(|r| backoff.delay(r)).collect();
        assert_eq!(delays, secs(&[5, 10, 20, 40, 80, 160, 320, 600, 600, 600]));
    }

    #[test]
    fn test_delay_never_overflows() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(31), Duration::from_secs(600));
        assert_eq!(backoff.delay(32), Duration::from_secs(600));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(600));
    }

    #[test]
    fn test_custom_schedule() {
        let backoff = Backoff::new(Duration::from_millis(100), Duration::from_secs(1));
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(3), Duration::from_millis(800));
        assert_eq!(backoff.delay(4), Duration::from_secs(1));
    }

    #[test]
    fn test_retry_state_counts_failures() {
        let mut state = RetryState::new(Backoff::default());
        assert_eq!(state.next_delay(), Duration::from_secs(5));
        assert_eq!(state.next_delay(), Duration::from_secs(10));
        assert_eq!(state.next_delay(), Duration::from_secs(20));
        assert_eq!(state.retries(), 3);
    }
}
