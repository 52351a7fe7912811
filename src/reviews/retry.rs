use std::time::Duration;

use rand::Rng;

use crate::config::LedgerConfig;

/// Exponential backoff with jitter for optimistic ledger commits.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// No waiting between attempts; for tests that force conflicts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Wait before retrying after the `attempt`-th failed try (1-based):
    /// `base * 2^(attempt-1)` capped at `max_delay`, plus up to half of that
    /// again as jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1u32 << exp)
            .min(self.max_delay);

        let jitter_cap = backoff.as_millis() as u64 / 2;
        let jitter = if jitter_cap == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_cap)
        };
        backoff + Duration::from_millis(jitter)
    }
}

impl From<&LedgerConfig> for RetryPolicy {
    fn from(cfg: &LedgerConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_and_stay_bounded() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
        };

        let first = policy.delay_for(1);
        assert!(first >= Duration::from_millis(100));
        assert!(first <= Duration::from_millis(150));

        let third = policy.delay_for(3);
        assert!(third >= Duration::from_millis(400));

        for attempt in 1..=40 {
            assert!(policy.delay_for(attempt) <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn immediate_policy_never_sleeps() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
        assert_eq!(policy.delay_for(10), Duration::ZERO);
    }

    #[test]
    fn config_conversion_keeps_at_least_one_attempt() {
        let cfg = LedgerConfig {
            max_attempts: 0,
            base_delay_ms: 5,
            max_delay_ms: 50,
        };
        let policy = RetryPolicy::from(&cfg);
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::from_millis(5));
    }
}
