//! Exponential backoff for transient download failures.

use std::future::Future;
use std::time::Duration;

use crate::error::ImageError;

/// Returns `true` if `err` is worth retrying after a backoff delay.
///
/// Network failures, 429 and 5xx responses are transient. Other statuses,
/// redirect problems and local I/O errors are returned immediately.
pub(crate) fn is_retriable(err: &ImageError) -> bool {
    match err {
        ImageError::Http(_) => true,
        ImageError::UnexpectedStatus { status, .. } => *status == 429 || (500..600).contains(status),
        ImageError::MissingRedirectLocation { .. }
        | ImageError::TooManyRedirects { .. }
        | ImageError::InvalidUrl { .. }
        | ImageError::Io { .. } => false,
    }
}

/// Runs `operation`, retrying transient errors up to `max_retries` extra
/// times. The wait before the n-th retry is `backoff_base_secs * 2^(n-1)`
/// seconds. With `max_retries = 0` the operation runs exactly once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ImageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ImageError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient download error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}
