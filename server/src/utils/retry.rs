//! Async retry utilities with exponential backoff

use std::time::Duration;

/// Default maximum attempts for remote queries (no retry)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// Default base delay in milliseconds for exponential backoff
pub const DEFAULT_BASE_DELAY_MS: u64 = 100;

/// Retry an async operation with exponential backoff while `should_retry`
/// accepts the error.
///
/// Returns `Ok((value, attempts))` on success, or `Err((error, attempts))`
/// once attempts run out or the error is not retryable.
pub async fn retry_with_backoff_async<T, E, F, Fut, R>(
    max_attempts: u32,
    base_delay_ms: u64,
    should_retry: R,
    mut operation: F,
) -> Result<(T, u32), (E, u32)>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(value) => return Ok((value, attempts)),
            Err(e) => {
                if attempts >= max_attempts.max(1) || !should_retry(&e) {
                    return Err((e, attempts));
                }
                let delay = Duration::from_millis(base_delay_ms * 2_u64.pow(attempts - 1));
                tracing::warn!(
                    error = %e,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Retrying after transient error"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
