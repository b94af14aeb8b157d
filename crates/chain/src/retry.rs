//! Deadline and retry wrapper for chain reads.
//!
//! Every collaborator call the engine issues goes through [`with_retry`]:
//! a per-attempt deadline via `tokio::time::timeout`, then exponential
//! backoff with jitter via `backon`, retrying only errors classified
//! retryable by [`ReadError::is_retryable`]. An unreachable provider can
//! therefore never hang a reconciliation pass.

use std::{future::Future, time::Duration};

use backon::{ExponentialBuilder, Retryable};
use vaultscope_types::{ReadError, RetryPolicy};

/// Executes a chain read with a per-attempt deadline and bounded retries.
///
/// Non-retryable errors (reverted calls, oversized ranges) are returned
/// immediately. Retryable errors are reattempted up to
/// `policy.max_attempts` total attempts with exponential backoff.
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    deadline: Duration,
    mut operation: F,
) -> Result<T, ReadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ReadError>>,
{
    // backon's max_times counts retries, not total attempts.
    let max_retries = policy.max_attempts.saturating_sub(1) as usize;

    let backoff = ExponentialBuilder::new()
        .with_min_delay(policy.initial_backoff)
        .with_max_delay(policy.max_backoff)
        .with_factor(policy.multiplier as f32)
        .with_jitter()
        .with_max_times(max_retries);

    let bounded = move || {
        let attempt = operation();
        async move {
            match tokio::time::timeout(deadline, attempt).await {
                Ok(result) => result,
                Err(_) => Err(ReadError::Timeout { duration_ms: deadline.as_millis() as u64 }),
            }
        }
    };

    bounded
        .retry(backoff)
        .sleep(tokio::time::sleep)
        .when(ReadError::is_retryable)
        .notify(|err: &ReadError, dur: Duration| {
            tracing::debug!(
                backoff_ms = dur.as_millis() as u64,
                error = %err,
                "retrying chain read"
            );
        })
        .await
}
