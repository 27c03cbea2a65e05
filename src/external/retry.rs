//! Attempt loop shared by the remote clients.
//!
//! Every attempt runs under its own timeout. A timed out attempt is dropped,
//! which aborts its connection, before the next delay starts. Retries are
//! sequential.

use std::{fmt::Display, future::Future, time::Duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    /// One entry per retry; `delays.len() + 1` attempts at most.
    pub delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, delays: Vec<Duration>) -> Self {
        Self { timeout, delays }
    }

    pub fn from_millis(timeout_ms: u64, delays_ms: &[u64]) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            delays: delays_ms.iter().copied().map(Duration::from_millis).collect(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.delays.len() as u32 + 1
    }
}

/// Errors a retry loop knows how to classify.
pub trait Retryable: Display {
    fn is_retryable(&self) -> bool;

    /// The error an attempt resolves to when it outlives its timeout.
    fn timed_out(attempt: u32, timeout: Duration) -> Self;
}

/// Runs `attempt` until it succeeds, fails with a non-retryable error, or
/// the policy's delays are used up. The last error is returned.
pub async fn with_retry<T, E, F, Fut>(
    target: &str,
    policy: &RetryPolicy,
    mut attempt: F,
) -> Result<T, E>
where
    E: Retryable,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut number = 1;

    loop {
        let outcome = match tokio::time::timeout(policy.timeout, attempt(number)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(E::timed_out(number, policy.timeout)),
        };

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let delay = match policy.delays.get(number as usize - 1) {
            Some(delay) if err.is_retryable() => *delay,
            _ => return Err(err),
        };

        tracing::warn!(
            target_service = target,
            attempt = number,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
        number += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient(u32),
        Fatal(u32),
        Timeout(u32),
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self)
        }
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            !matches!(self, TestError::Fatal(_))
        }

        fn timed_out(attempt: u32, _: Duration) -> Self {
            TestError::Timeout(attempt)
        }
    }

    fn policy(delays: &[u64]) -> RetryPolicy {
        RetryPolicy::from_millis(1_000, delays)
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);

        let result: Result<u32, TestError> = with_retry("test", &policy(&[1, 1]), |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TestError::Transient(n))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(assert_ok!(result), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_delays_and_returns_last_error() {
        let started = Instant::now();

        let result: Result<(), TestError> =
            with_retry("test", &policy(&[10, 20]), |n| async move { Err(TestError::Transient(n)) })
                .await;

        assert_eq!(assert_err!(result), TestError::Transient(3));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), TestError> = with_retry("test", &policy(&[1, 1, 1]), |n| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(TestError::Fatal(n)) }
        })
        .await;

        assert_eq!(assert_err!(result), TestError::Fatal(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_attempts_time_out() {
        let policy = RetryPolicy::from_millis(20, &[1]);

        let result: Result<(), TestError> = with_retry("test", &policy, |_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert_eq!(assert_err!(result), TestError::Timeout(2));
    }

    #[test]
    fn attempts_are_delays_plus_one() {
        assert_eq!(policy(&[]).max_attempts(), 1);
        assert_eq!(policy(&[1000, 2000, 4000]).max_attempts(), 4);
    }
}
