//! Bounded retry with capped exponential backoff for advisor calls.

use noughts_core::{AdvisorError, AdvisorErrorKind};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// How often and how long to try an advisor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct RetryPolicy {
    /// Total attempts, at least one.
    max_attempts: u32,
    /// Wait before the second attempt; doubles after each failure.
    backoff: Duration,
    /// Upper bound on any single wait.
    max_backoff: Duration,
    /// Time allowed for one attempt.
    attempt_timeout: Duration,
}

impl RetryPolicy {
    /// Creates a retry policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: u32, backoff: Duration, max_backoff: Duration, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            max_backoff,
            attempt_timeout,
        }
    }

    /// Wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Worst-case wall time for [`RetryPolicy::run`].
    pub fn budget(&self) -> Duration {
        let waits: Duration = (1..self.max_attempts).map(|a| self.delay_after(a)).sum();
        self.attempt_timeout.saturating_mul(self.max_attempts) + waits
    }

    /// Runs `op` until it succeeds or the attempts are used up.
    ///
    /// Each attempt is cut off after `attempt_timeout`. The last error is
    /// returned when every attempt fails.
    #[instrument(skip(self, op), fields(max_attempts = self.max_attempts))]
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, AdvisorError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AdvisorError>>,
    {
        let mut attempt = 1;
        loop {
            let result = match tokio::time::timeout(self.attempt_timeout, op(attempt)).await {
                Ok(result) => result,
                Err(_) => Err(AdvisorError::new(
                    AdvisorErrorKind::Timeout,
                    format!("Attempt {} exceeded {:?}", attempt, self.attempt_timeout),
                )),
            };

            match result {
                Ok(value) => {
                    debug!(attempt, "Advisor call succeeded");
                    return Ok(value);
                }
                Err(e) if attempt >= self.max_attempts => {
                    warn!(attempt, error = %e, "Advisor retries exhausted");
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(attempt, error = %e, ?delay, "Advisor call failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(4), Duration::from_secs(15))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(1),
            Duration::from_millis(2),
            Duration::from_millis(50),
        )
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(350), Duration::from_secs(1));
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(350));
        assert_eq!(policy.delay_after(40), Duration::from_millis(350));
    }

    #[test]
    fn test_budget() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(1), Duration::from_secs(2));
        // 3 attempts x 2s + waits of 100ms and 200ms
        assert_eq!(policy.budget(), Duration::from_millis(6300));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(*fast(0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let result = fast(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(AdvisorError::new(AdvisorErrorKind::Transport, "flaky"))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast(2)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AdvisorError::new(AdvisorErrorKind::Malformed, "nonsense")) }
            })
            .await;
        assert_eq!(result.unwrap_err().kind, AdvisorErrorKind::Malformed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_attempt_times_out() {
        let result: Result<(), _> = fast(1)
            .run(|_| async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await;
        assert_eq!(result.unwrap_err().kind, AdvisorErrorKind::Timeout);
    }
}
