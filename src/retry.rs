//! Delay between consumer read attempts.

use std::time::Duration;

/// Delay before the first retry (and every retry, with a multiplier of 1).
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);
/// Upper bound for the delay once a multiplier grows it.
pub const DEFAULT_RETRY_MAX_INTERVAL: Duration = Duration::from_secs(300);

/// Retry schedule for failed reads.
///
/// The n-th consecutive failure waits `initial * multiplier^(n-1)`, capped at
/// `max`. The default is a fixed 10 second delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub initial: Duration,
    pub multiplier: f64,
    pub max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_RETRY_INTERVAL)
    }
}

impl RetryPolicy {
    /// Same delay after every failure.
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial: interval,
            multiplier: 1.0,
            max: interval.max(DEFAULT_RETRY_MAX_INTERVAL),
        }
    }

    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> anyhow::Result<Self> {
        if initial.is_zero() {
            anyhow::bail!("Retry interval must be greater than zero");
        }
        if !multiplier.is_finite() || multiplier < 1.0 {
            anyhow::bail!("Retry multiplier must be at least 1.0, got {multiplier}");
        }
        if max < initial {
            anyhow::bail!(
                "Maximum retry interval {max:?} is shorter than the retry interval {initial:?}"
            );
        }
        Ok(Self {
            initial,
            multiplier,
            max,
        })
    }

    /// Delay after `failures` consecutive failures (counting from 1).
    pub fn delay(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_ten_seconds() {
        let policy = RetryPolicy::default();
        for failures in [1, 2, 10, 1000, u32::MAX] {
            assert_eq!(policy.delay(failures), Duration::from_secs(10));
        }
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy =
            RetryPolicy::new(Duration::from_secs(1), 2.0, Duration::from_secs(30)).unwrap();

        assert_eq!(policy.delay(1), Duration::from_secs(1));
        assert_eq!(policy.delay(2), Duration::from_secs(2));
        assert_eq!(policy.delay(5), Duration::from_secs(16));
        assert_eq!(policy.delay(6), Duration::from_secs(30));
        assert_eq!(policy.delay(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_fractional_multiplier_progression() {
        let policy =
            RetryPolicy::new(Duration::from_secs(10), 1.5, Duration::from_secs(60)).unwrap();

        // failures -> expected millis (cap at 60s)
        let cases = [(1, 10_000), (2, 15_000), (3, 22_500), (4, 33_750), (5, 50_625), (6, 60_000)];
        for (failures, expected_ms) in cases {
            assert_eq!(
                policy.delay(failures).as_millis(),
                expected_ms,
                "failures {failures}"
            );
        }
    }

    #[test]
    fn test_invalid_policies_are_rejected() {
        assert!(RetryPolicy::new(Duration::ZERO, 1.0, Duration::from_secs(1)).is_err());
        assert!(RetryPolicy::new(Duration::from_secs(1), 0.5, Duration::from_secs(1)).is_err());
        assert!(
            RetryPolicy::new(Duration::from_secs(1), f64::NAN, Duration::from_secs(1)).is_err()
        );
        assert!(RetryPolicy::new(Duration::from_secs(10), 1.0, Duration::from_secs(1)).is_err());
    }
}
