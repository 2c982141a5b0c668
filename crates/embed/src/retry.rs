//! Backoff for transient embedding-provider failures.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::EmbedError;

/// How often, and how patiently, a failed provider call is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Extra attempts after the first call.
    pub max_retries: u32,
    /// Delay before the first retry; doubles per retry.
    #[serde(with = "crate::serde_millis")]
    pub base_delay: Duration,
    #[serde(with = "crate::serde_millis")]
    pub max_delay: Duration,
    /// Stretch each delay by a random 0-50%.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Wait before retry number `retry` (zero-based), capped at `max_delay`
    /// before jitter is applied.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        let capped = self.base_delay.saturating_mul(factor).min(self.max_delay);
        if !self.jitter {
            return capped;
        }
        let spread = capped.as_millis() as u64 / 2;
        capped + Duration::from_millis(fastrand::u64(0..=spread))
    }
}

/// Runs `call` until it succeeds, fails with a non-transient error, or the
/// retry budget is spent. The last error is returned as-is.
pub(crate) async fn with_retry<T, F, Fut>(policy: &RetryConfig, mut call: F) -> Result<T, EmbedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EmbedError>>,
{
    let start = Instant::now();
    let mut retry = 0;
    loop {
        let err = match call().await {
            Ok(value) => {
                if retry > 0 {
                    debug!(
                        retries = retry,
                        elapsed_micros = start.elapsed().as_micros() as u64,
                        "embedding_recovered"
                    );
                }
                return Ok(value);
            }
            Err(err) => err,
        };
        if retry >= policy.max_retries || !err.is_transient() {
            return Err(err);
        }
        let wait = policy.backoff(retry);
        warn!(
            retry = retry + 1,
            max_retries = policy.max_retries,
            wait_millis = wait.as_millis() as u64,
            error = %err,
            "embedding_retry"
        );
        tokio::time::sleep(wait).await;
        retry += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn quick(max_retries: u32) -> RetryConfig {
        RetryConfig::default()
            .with_max_retries(max_retries)
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false)
    }

    fn unavailable() -> EmbedError {
        EmbedError::Status {
            status: 503,
            body: "overloaded".into(),
        }
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&quick(3), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(unavailable()) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_when_budget_is_spent() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&quick(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(unavailable()) }
        })
        .await;

        assert_eq!(result.unwrap_err(), unavailable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&quick(5), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(EmbedError::Status {
                    status: 401,
                    body: "bad key".into(),
                })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_policy_calls_once() {
        let calls = AtomicU32::new(0);
        let _: Result<(), _> = with_retry(&RetryConfig::disabled(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(EmbedError::Request("connection refused".into())) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let policy = RetryConfig::default()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(250))
            .with_jitter(false);
        assert_eq!(policy.backoff(0), Duration::from_millis(100));
        assert_eq!(policy.backoff(1), Duration::from_millis(200));
        assert_eq!(policy.backoff(5), Duration::from_millis(250));
        assert_eq!(policy.backoff(40), Duration::from_millis(250));
    }

    #[test]
    fn jitter_stays_within_half() {
        let policy = RetryConfig::default().with_base_delay(Duration::from_millis(100));
        for _ in 0..50 {
            let wait = policy.backoff(0);
            assert!(wait >= Duration::from_millis(100));
            assert!(wait <= Duration::from_millis(150));
        }
    }

    #[test]
    fn durations_serialize_as_millis() {
        let policy = RetryConfig::default();
        let json = serde_json::to_value(policy).unwrap();
        assert_eq!(json["base_delay"], 100);
        assert_eq!(json["max_delay"], 10_000);
        let back: RetryConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, policy);
    }
}
