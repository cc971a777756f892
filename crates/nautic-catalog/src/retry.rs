//! Backoff for transient catalog and storefront request failures.

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Network failures, 429 and 5xx responses are transient; everything else
/// is returned immediately.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    match err {
        CatalogError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        CatalogError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
        CatalogError::Csv(_)
        | CatalogError::Io { .. }
        | CatalogError::Json { .. }
        | CatalogError::Config(_)
        | CatalogError::Storefront(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors, sleeping `backoff_base_secs * 2^(n-1)` seconds before
/// the n-th retry.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                let delay_secs = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_secs,
                    error = %err,
                    "transient catalog request error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn storefront_errors_are_not_retriable() {
        assert!(!is_retriable(&CatalogError::Storefront("bad query".to_owned())));
        assert!(is_retriable(&CatalogError::UnexpectedStatus {
            status: 503,
            url: "https://example.com/ricambi.json".to_owned(),
        }));
        assert!(!is_retriable(&CatalogError::UnexpectedStatus {
            status: 404,
            url: "https://example.com/ricambi.json".to_owned(),
        }));
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(CatalogError::UnexpectedStatus {
                    status: 429,
                    url: "https://example.com".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(result.is_err());
    }
}
