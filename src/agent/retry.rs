// MEDIASCOUT Retry Helper — Backoff for Flaky Sources
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT
//
// Free media APIs rate-limit aggressively and drop connections under load.
// Every network call funnels through `with_retry`, which backs off
// exponentially on transient failures and gives up immediately on 4xx
// responses: the server has already made up its mind.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Failure taxonomy for search and download calls.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl FetchError {
    /// 4xx responses are the caller's fault and are never retried.
    pub fn is_client_error(&self) -> bool {
        matches!(self, FetchError::Status(code) if (400..500).contains(code))
    }

    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Base delay in seconds; attempt N sleeps `base * 2^N`.
    pub base_delay_secs: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 1.0,
        }
    }
}

/// Run `op` up to `policy.max_attempts` times with exponential backoff.
///
/// Client errors (HTTP 4xx) abort immediately. Anything else is retried;
/// once attempts are exhausted the last error is returned.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut last_error = FetchError::Network("no attempts were made".to_string());

    for attempt in 0..policy.max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_client_error() => {
                error!("[RETRY] ❌ Client error ({}), not retrying", err);
                return Err(err);
            }
            Err(err) => last_error = err,
        }

        if attempt + 1 < policy.max_attempts {
            let delay = policy.base_delay_secs * 2f64.powi(attempt as i32);
            warn!(
                "[RETRY] ⚠️ Attempt {}/{} failed ({}). Retrying in {:.1}s...",
                attempt + 1,
                policy.max_attempts,
                last_error,
                delay
            );
            tokio::time::sleep(Duration::from_secs_f64(delay)).await;
        }
    }

    error!(
        "[RETRY] ❌ Failed after {} attempts: {}",
        policy.max_attempts, last_error
    );
    Err(last_error)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay_secs: 0.0,
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_two_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(fast_policy(), move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(FetchError::Timeout)
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<u32, _> = with_retry(fast_policy(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Status(404))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_server_error_exhausts_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<u32, _> = with_retry(fast_policy(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::Status(503))
            }
        })
        .await;

        assert!(matches!(result, Err(FetchError::Status(503))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_client_error_classification() {
        assert!(FetchError::Status(400).is_client_error());
        assert!(FetchError::Status(404).is_client_error());
        assert!(FetchError::Status(499).is_client_error());
        assert!(!FetchError::Status(500).is_client_error());
        assert!(!FetchError::Status(302).is_client_error());
        assert!(!FetchError::Timeout.is_client_error());
        assert!(!FetchError::Network("reset".to_string()).is_client_error());
    }
}
