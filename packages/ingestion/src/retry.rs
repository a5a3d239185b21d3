//! Bounded-retry combinator for flaky external calls.
//!
//! Provider calls and listing fetches share this single retry path instead
//! of carrying their own sleep loops.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one (minimum 1)
    pub attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// The production policy for provider calls: 3 attempts, 30s apart.
    pub const fn provider_default() -> Self {
        Self::new(3, Duration::from_secs(30))
    }

    /// The production policy for listing fetches: 3 attempts, 5s apart.
    pub const fn listing_default() -> Self {
        Self::new(3, Duration::from_secs(5))
    }

    /// A zero-delay policy for tests.
    pub const fn immediate(attempts: u32) -> Self {
        Self::new(attempts, Duration::ZERO)
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted,
/// sleeping `policy.delay` between attempts. Returns the last error on
/// exhaustion.
pub async fn with_retry<T, E, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < attempts => {
                warn!(
                    attempt,
                    attempts,
                    error = %error,
                    "{what} failed, retrying in {:?}",
                    policy.delay
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => {
                warn!(attempts, error = %error, "{what} failed, giving up");
                return Err(error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_returns_first_success() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(RetryPolicy::immediate(3), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(RetryPolicy::immediate(3), "op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err("boom".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_after_exactly_configured_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(RetryPolicy::immediate(3), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom".to_string()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, String> = with_retry(RetryPolicy::immediate(0), "op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("boom".to_string()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
