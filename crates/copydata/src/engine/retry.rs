//! Retry execution around single store calls.

use std::future::Future;
use std::time::Duration;

use copydata_core::retry::RetryPolicy;
use copydata_core::storage::StoreError;
use rand::Rng;

/// Runs `call` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted.
///
/// Each attempt is bounded by `policy.op_timeout`; an attempt that times out
/// counts as a retryable [`StoreError::Timeout`].
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut call: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt = 1;
    loop {
        let outcome = match tokio::time::timeout(policy.op_timeout, call()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(StoreError::Timeout(policy.op_timeout.as_millis() as u64)),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && policy.allows_retry_after(attempt) => {
                let delay = jitter(policy.delay_for(attempt));
                tracing::warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Spreads concurrent retries over the upper half of the backoff window.
fn jitter(delay: Duration) -> Duration {
    delay.mul_f64(rand::rng().random_range(0.5..=1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&RetryPolicy::testing(), "scan", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, StoreError>(7)
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&RetryPolicy::testing(), "put_item", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(StoreError::Throttled("slow down".to_string()))
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&RetryPolicy::testing(), "scan", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Transient("internal".to_string()))
        })
        .await;

        assert_eq!(result, Err(StoreError::Transient("internal".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_is_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&RetryPolicy::testing(), "put_item", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::AlreadyExists("userId=u-1".to_string()))
        })
        .await;

        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hung_call_times_out() {
        let policy = RetryPolicy {
            max_attempts: 2,
            op_timeout: Duration::from_millis(20),
            ..RetryPolicy::testing()
        };
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry(&policy, "delete_item", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert_eq!(result, Err(StoreError::Timeout(20)));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_jitter_stays_within_window() {
        let base = Duration::from_millis(400);
        for _ in 0..100 {
            let delay = jitter(base);
            assert!(delay >= Duration::from_millis(200) && delay <= base);
        }
    }
}
