//! Shared retry engine for transient failures.
//!
//! Both the storefront API client (fixed delay) and the navigation guard
//! (linear backoff) run their attempts through [`run`], differing only in
//! attempt budget, backoff shape, and which errors count as transient.

use std::future::Future;
use std::time::Duration;

use crate::error::ScrapeError;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Same delay after every failed attempt.
    Fixed(Duration),
    /// `base * n` after the n-th failed attempt (1-based).
    Linear(Duration),
}

impl Backoff {
    /// Delay after the failure with the given 0-based index.
    #[must_use]
    pub fn delay(&self, failure_index: u32) -> Duration {
        match self {
            Backoff::Fixed(delay) => *delay,
            Backoff::Linear(base) => base.saturating_mul(failure_index + 1),
        }
    }
}

/// Run `operation` up to `max_attempts` times, sleeping per `backoff`
/// between attempts. Errors rejected by the `retryable` predicate are
/// returned immediately; exhaustion returns the last error.
///
/// # Errors
///
/// Returns the operation's error when attempts are exhausted or the error
/// is not retryable.
pub async fn run<T, F, Fut, P>(
    max_attempts: u32,
    backoff: Backoff,
    mut retryable: P,
    mut operation: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
    P: FnMut(&ScrapeError) -> bool,
{
    let mut failures = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                failures += 1;
                if failures >= max_attempts || !retryable(&err) {
                    return Err(err);
                }
                let delay = backoff.delay(failures - 1);
                tracing::warn!(
                    attempt = failures,
                    max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    error = %err,
                    "transient failure, retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Transient-error policy for the storefront API: rate limits, transport
/// errors, and server-side 5xx responses are worth another attempt.
#[must_use]
pub fn transient_http(err: &ScrapeError) -> bool {
    match err {
        ScrapeError::RateLimited { .. } | ScrapeError::Http(_) => true,
        ScrapeError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn rate_limited() -> ScrapeError {
        ScrapeError::RateLimited {
            retry_after_secs: 0,
        }
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result = run(3, Backoff::Fixed(Duration::ZERO), transient_http, move || {
            let calls = Arc::clone(&calls_clone);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ScrapeError>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result = run(3, Backoff::Fixed(Duration::ZERO), transient_http, move || {
            let calls = Arc::clone(&calls_clone);
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limited())
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_attempts_and_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), _> =
            run(3, Backoff::Fixed(Duration::ZERO), transient_http, move || {
                let calls = Arc::clone(&calls_clone);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(rate_limited())
                }
            })
            .await;

        assert!(matches!(result, Err(ScrapeError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);

        let result: Result<(), _> =
            run(3, Backoff::Fixed(Duration::ZERO), transient_http, move || {
                let calls = Arc::clone(&calls_clone);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ScrapeError::UnexpectedStatus {
                        status: 404,
                        url: "https://shop.example/x".to_string(),
                    })
                }
            })
            .await;

        assert!(matches!(
            result,
            Err(ScrapeError::UnexpectedStatus { status: 404, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn linear_backoff_grows_per_failure() {
        let backoff = Backoff::Linear(Duration::from_secs(2));
        assert_eq!(backoff.delay(0), Duration::from_secs(2));
        assert_eq!(backoff.delay(1), Duration::from_secs(4));
        assert_eq!(backoff.delay(2), Duration::from_secs(6));
    }

    #[test]
    fn transient_http_policy() {
        assert!(transient_http(&rate_limited()));
        assert!(transient_http(&ScrapeError::UnexpectedStatus {
            status: 503,
            url: String::new(),
        }));
        assert!(!transient_http(&ScrapeError::UnexpectedStatus {
            status: 404,
            url: String::new(),
        }));
        assert!(!transient_http(&ScrapeError::CategoryUnresolved {
            slug: "x".to_string(),
        }));
    }
}
