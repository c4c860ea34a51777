//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Stateful exponential backoff: `base * 2^n`, capped at `max`, plus up to
/// 10% jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        let base_ms = millis(base);
        Self {
            base_ms,
            max_ms: millis(max).max(base_ms),
            attempt: 0,
        }
    }

    /// Number of delays handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    /// Delay to wait before the next attempt.
    pub fn next_delay(&mut self) -> Duration {
        let exponential = 2u64.saturating_pow(self.attempt);
        self.attempt = self.attempt.saturating_add(1);

        let capped = self.base_ms.saturating_mul(exponential).min(self.max_ms);

        // Apply jitter (0 to 10% of the delay)
        let jitter_range = capped / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(capped.saturating_add(jitter))
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_growth_and_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(1000));

        let first = backoff.next_delay().as_millis();
        assert!((100..110).contains(&first));

        let second = backoff.next_delay().as_millis();
        assert!((200..220).contains(&second));

        for _ in 0..10 {
            backoff.next_delay();
        }
        let capped = backoff.next_delay().as_millis();
        assert!((1000..1100).contains(&capped));
        assert_eq!(backoff.attempts(), 13);
    }

    #[test]
    fn test_reset_restarts_sequence() {
        let mut backoff = Backoff::new(Duration::from_millis(50), Duration::from_secs(5));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert!(backoff.next_delay() < Duration::from_millis(60));
    }

    #[test]
    fn test_huge_cap_saturates() {
        let mut backoff = Backoff::new(Duration::from_millis(u64::MAX / 2), Duration::MAX);
        for _ in 0..4 {
            assert!(backoff.next_delay() >= Duration::from_millis(u64::MAX / 2));
        }
    }

    #[test]
    fn test_zero_base_never_sleeps() {
        let mut backoff = Backoff::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(backoff.next_delay(), Duration::ZERO);
    }
}
