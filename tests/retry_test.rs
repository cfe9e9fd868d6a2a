//! `with_retry` on tokio's paused clock.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use huginn::providers::{Backoff, RetryConfig, with_retry};
use huginn::{HuginnError, Result};
use tokio::time::Instant;

/// Fails `failures` times with `error`, then succeeds with the attempt count.
struct Flaky {
    failures: u32,
    error: fn() -> HuginnError,
    calls: AtomicU32,
}

impl Flaky {
    fn new(failures: u32, error: fn() -> HuginnError) -> Self {
        Self {
            failures,
            error,
            calls: AtomicU32::new(0),
        }
    }

    async fn call(&self) -> Result<u32> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        if n <= self.failures {
            Err((self.error)())
        } else {
            Ok(n)
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

fn reset() -> HuginnError {
    HuginnError::Http("connection reset".into())
}

#[tokio::test(start_paused = true)]
async fn recovers_after_transient_failures() {
    let flaky = Flaky::new(2, reset);
    let start = Instant::now();

    let result = with_retry(&RetryConfig::default(), "user", || flaky.call()).await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let flaky = Flaky::new(10, reset);

    let result = with_retry(&RetryConfig::default(), "user", || flaky.call()).await;

    assert!(matches!(result, Err(HuginnError::Http(_))));
    assert_eq!(flaky.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn permanent_errors_are_not_retried() {
    let flaky = Flaky::new(10, || HuginnError::NotFound("ghost".into()));

    let result = with_retry(&RetryConfig::default(), "user", || flaky.call()).await;

    assert!(matches!(result, Err(HuginnError::NotFound(_))));
    assert_eq!(flaky.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn rate_limit_hint_sets_the_delay() {
    let flaky = Flaky::new(1, || HuginnError::RateLimited {
        retry_after: Some(Duration::from_secs(7)),
    });
    let start = Instant::now();

    let result = with_retry(&RetryConfig::default(), "search", || flaky.call()).await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(start.elapsed(), Duration::from_secs(7));
}

#[tokio::test(start_paused = true)]
async fn exponential_backoff_doubles() {
    let flaky = Flaky::new(3, reset);
    let config = RetryConfig::new()
        .max_attempts(4)
        .initial_delay(Duration::from_secs(1))
        .backoff(Backoff::Exponential);
    let start = Instant::now();

    let result = with_retry(&config, "repo", || flaky.call()).await;

    assert_eq!(result.unwrap(), 4);
    // 1s + 2s + 4s
    assert_eq!(start.elapsed(), Duration::from_secs(7));
}
