use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::ApiResult;

/// Retry settings with linear backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_retries: u32,
    /// Wait before the second attempt; later waits grow by the same step
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Run `operation` until it succeeds, fails for good, or runs out of attempts
    ///
    /// Only transport failures and 5xx responses are tried again.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> ApiResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let attempts = self.max_retries.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) if !error.is_retryable() => return Err(error),
                Err(error) if attempt >= attempts => {
                    warn!("Giving up after {} attempts: {}", attempts, error);
                    return Err(error);
                }
                Err(error) => {
                    let wait = self.delay * attempt;
                    debug!("Attempt {} failed, retrying in {:?}: {}", attempt, wait, error);
                    sleep(wait).await;
                }
            }
        }
    }
}

/// Retry `operation` with linear backoff of `delay × attempt`; non-retryable failures return at once
pub async fn retry_request<T, F, Fut>(operation: F, max_retries: u32, delay: Duration) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    RetryPolicy { max_retries, delay }.execute(operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, ClientConfig};
    use crate::error::{ApiException, ErrorCode};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const STEP: Duration = Duration::from_millis(1);

    #[tokio::test]
    async fn test_retry_success_after_server_errors() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = retry_request(
            || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(ApiException::new(ErrorCode::InternalError, "boom", 503))
                    } else {
                        Ok(42)
                    }
                }
            },
            3,
            STEP,
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: ApiResult<()> = retry_request(
            || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(ApiException::new(ErrorCode::NotFound, "missing", 404))
                }
            },
            3,
            STEP,
        )
        .await;

        assert!(result.unwrap_err().is_not_found());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_network_errors_exhaust_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: ApiResult<()> = RetryPolicy {
            max_retries: 2,
            delay: STEP,
        }
        .execute(|| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ApiException::new(ErrorCode::NetworkError, "offline", 0))
            }
        })
        .await;

        assert!(result.unwrap_err().is_network());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_url_is_not_retried() {
        let client = ApiClient::new(ClientConfig::new("not a url")).unwrap();
        let attempts = Arc::new(AtomicU32::new(0));

        let result: ApiResult<serde_json::Value> = retry_request(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                client.get("/trainee/stats")
            },
            3,
            STEP,
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.code, ErrorCode::InternalError);
        assert!(!error.is_network());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_grows_linearly() {
        let started = tokio::time::Instant::now();
        let delay = Duration::from_millis(20);

        let _: ApiResult<()> = retry_request(
            || async { Err(ApiException::new(ErrorCode::InternalError, "down", 500)) },
            3,
            delay,
        )
        .await;

        // 20ms after the first attempt plus 40ms after the second
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
