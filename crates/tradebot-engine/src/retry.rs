//! Delay between control loop iterations.

use std::time::Duration;

/// How long to wait before the next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Same delay after success and failure.
    Fixed { delay: Duration },
    /// `base` after a success; doubles with each consecutive failed
    /// iteration, never exceeding `max`.
    Backoff { base: Duration, max: Duration },
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        RetryPolicy::Fixed { delay }
    }

    pub fn backoff(base: Duration, max: Duration) -> Self {
        RetryPolicy::Backoff {
            base,
            max: max.max(base),
        }
    }

    /// Delay after `consecutive_failures` failed iterations in a row.
    pub fn delay(&self, consecutive_failures: u32) -> Duration {
        match *self {
            RetryPolicy::Fixed { delay } => delay,
            RetryPolicy::Backoff { base, max } => base
                .checked_mul(2u32.saturating_pow(consecutive_failures))
                .map_or(max, |d| d.min(max)),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::Fixed {
            delay: Duration::from_secs(20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ignores_failures() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(20));
        assert_eq!(policy.delay(7), Duration::from_secs(20));
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::backoff(Duration::from_secs(20), Duration::from_secs(120));
        assert_eq!(policy.delay(0), Duration::from_secs(20));
        assert_eq!(policy.delay(1), Duration::from_secs(40));
        assert_eq!(policy.delay(2), Duration::from_secs(80));
        assert_eq!(policy.delay(3), Duration::from_secs(120));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(120));
    }

    #[test]
    fn test_backoff_cap_never_below_base() {
        let policy = RetryPolicy::backoff(Duration::from_secs(30), Duration::from_secs(10));
        assert_eq!(policy.delay(0), Duration::from_secs(30));
        assert_eq!(policy.delay(4), Duration::from_secs(30));
    }
}
