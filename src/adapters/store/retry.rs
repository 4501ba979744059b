//! Exponential backoff for idempotent store operations

use crate::config::RetryConfig;
use crate::domain::Result;
use std::future::Future;
use std::time::Duration;

/// Delay before retry number `attempt` (1-based)
pub(crate) fn backoff_delay(config: &RetryConfig, attempt: usize) -> Duration {
    let exponent = attempt.saturating_sub(1) as i32;
    let delay_ms = config.initial_delay_ms as f64 * config.backoff_multiplier.powi(exponent);
    let delay_ms = if delay_ms.is_finite() {
        (delay_ms as u64).min(config.max_delay_ms)
    } else {
        config.max_delay_ms
    };
    Duration::from_millis(delay_ms)
}

/// Run `operation` until it succeeds or `max_retries` attempts are used
pub(crate) async fn with_retry<F, T, Fut>(
    config: &RetryConfig,
    operation_name: &'static str,
    operation: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_retries.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return Err(e);
                }

                crate::log_retry_attempt!(operation_name, attempt, max_attempts, e);
                tokio::time::sleep(backoff_delay(config, attempt)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PipelineError, StoreError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_retry(max_retries: usize) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms: 1,
            max_delay_ms: 2,
            backoff_multiplier: 2.0,
        }
    }

    #[test]
    fn test_backoff_delay_is_capped() {
        let config = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: 300,
            backoff_multiplier: 2.0,
        };
        assert_eq!(backoff_delay(&config, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(&config, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(&config, 3), Duration::from_millis(300));
        assert_eq!(backoff_delay(&config, 10), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_with_retry_eventually_succeeds() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result = with_retry(&fast_retry(3), "list", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(PipelineError::Store(StoreError::Connection("reset".into())))
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_gives_up() {
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let result: Result<()> = with_retry(&fast_retry(2), "list", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(PipelineError::Store(StoreError::Connection("down".into())))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
