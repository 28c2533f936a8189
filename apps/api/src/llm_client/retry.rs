//! Bounded retry with multiplicative timeout growth.
//!
//! Attempts are retried immediately; what grows is the deadline each attempt gets.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::llm_client::error::GenerationError;

pub const MAX_RETRIES: u32 = 3;
pub const INITIAL_TIMEOUT: Duration = Duration::from_millis(60_000);
pub const BACKOFF_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_timeout: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            initial_timeout: INITIAL_TIMEOUT,
            backoff_multiplier: BACKOFF_MULTIPLIER,
        }
    }
}

/// One pass through the operation. Lives only as long as the retry loop.
#[derive(Debug, Clone, Copy)]
pub struct GenerationAttempt {
    pub attempt_number: u32,
    pub timeout: Duration,
    pub started_at: DateTime<Utc>,
}

impl RetryPolicy {
    /// Deadline for the 1-based `attempt`: `initial * multiplier^(attempt - 1)`, floored to ms.
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        let mut ms = self.initial_timeout.as_millis() as u64;
        for _ in 1..attempt.max(1) {
            ms = (ms as f64 * self.backoff_multiplier).floor() as u64;
        }
        Duration::from_millis(ms)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error, or
    /// `max_attempts` is used up. Every attempt started is pushed onto `log`.
    pub async fn execute<T, F, Fut>(
        &self,
        log: &mut Vec<GenerationAttempt>,
        mut operation: F,
    ) -> Result<T, GenerationError>
    where
        F: FnMut(GenerationAttempt) -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut timeout = self.timeout_for(1);
        let mut last_error = None;

        for attempt_number in 1..=max_attempts {
            let attempt = GenerationAttempt {
                attempt_number,
                timeout,
                started_at: Utc::now(),
            };
            log.push(attempt);
            info!(
                "Generation attempt {}/{} (timeout {}ms)",
                attempt_number,
                max_attempts,
                timeout.as_millis()
            );

            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    warn!("Attempt {} failed with non-retryable error: {}", attempt_number, err);
                    return Err(err);
                }
                Err(err) => {
                    warn!("Attempt {} failed: {}", attempt_number, err);
                    last_error = Some(err);
                    if attempt_number < max_attempts {
                        timeout = self.timeout_for(attempt_number + 1);
                        info!("Retrying with timeout {}ms", timeout.as_millis());
                    }
                }
            }
        }

        let last = last_error.unwrap_or_else(|| GenerationError::network("no attempt was made"));
        Err(GenerationError::Exhausted {
            attempts: max_attempts,
            last: Box::new(last),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_timeout_sequence_matches_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout_for(1), Duration::from_millis(60_000));
        assert_eq!(policy.timeout_for(2), Duration::from_millis(90_000));
        assert_eq!(policy.timeout_for(3), Duration::from_millis(135_000));
    }

    #[tokio::test]
    async fn test_succeeds_after_k_failures() {
        let policy = RetryPolicy::default();

        for k in 0..MAX_RETRIES {
            let calls = Arc::new(AtomicU32::new(0));
            let mut log = Vec::new();

            let result = policy
                .execute(&mut log, |_attempt| {
                    let calls = Arc::clone(&calls);
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) < k {
                            Err(GenerationError::network("connection reset"))
                        } else {
                            Ok("done")
                        }
                    }
                })
                .await;

            assert_eq!(result.unwrap(), "done");
            assert_eq!(log.len() as u32, k + 1);
            for (i, attempt) in log.iter().enumerate() {
                let expected =
                    INITIAL_TIMEOUT.as_millis() as f64 * BACKOFF_MULTIPLIER.powi(i as i32);
                assert_eq!(attempt.timeout.as_millis() as f64, expected);
                assert_eq!(attempt.attempt_number, i as u32 + 1);
            }
        }
    }

    #[tokio::test]
    async fn test_always_failing_exhausts_after_max_attempts() {
        let policy = RetryPolicy::default();
        let mut log = Vec::new();

        let err = policy
            .execute(&mut log, |attempt| async move {
                Err::<(), _>(GenerationError::Timeout {
                    timeout_ms: attempt.timeout.as_millis() as u64,
                })
            })
            .await
            .unwrap_err();

        assert_eq!(log.len() as u32, MAX_RETRIES);
        match err {
            GenerationError::Exhausted { attempts, last } => {
                assert_eq!(attempts, MAX_RETRIES);
                assert!(matches!(*last, GenerationError::Timeout { timeout_ms: 135_000 }));
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_aborts_on_first_attempt() {
        let policy = RetryPolicy::default();
        let mut log = Vec::new();

        let err = policy
            .execute(&mut log, |_| async {
                Err::<(), _>(GenerationError::Unauthorized("invalid key".into()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Unauthorized(_)));
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_output_is_retried() {
        let policy = RetryPolicy::default();
        let mut log = Vec::new();
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(&mut log, |_| {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(GenerationError::Malformed("prose only".into()))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn test_validation_failure_is_not_retried() {
        let policy = RetryPolicy::default();
        let mut log = Vec::new();

        let err = policy
            .execute(&mut log, |_| async {
                Err::<(), _>(GenerationError::ValidationFailed("fewer than 3 main keywords".into()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::ValidationFailed(_)));
        assert_eq!(log.len(), 1);
    }
}
