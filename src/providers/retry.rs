//! Retry configuration and the shared retry helper.
//!
//! Every remote call made by the [`EntityGateway`](crate::gateway::EntityGateway)
//! goes through [`with_retry()`], keeping the retry policy in a single place.
//! The policy is injected as a [`RetryConfig`]; tests run it on tokio's
//! paused clock so no real time passes.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::telemetry;
use crate::{HuginnError, Result};

/// How the delay grows between attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// The same delay before every retry.
    #[default]
    Fixed,
    /// `initial_delay * 2^attempt`, capped at `max_delay`.
    Exponential,
}

/// Configuration for retry behaviour on transient errors.
///
/// ```rust
/// # use huginn::RetryConfig;
/// # use std::time::Duration;
/// let config = RetryConfig::new()
///     .max_attempts(3)
///     .initial_delay(Duration::from_millis(200));
/// assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial request).
    /// 1 = no retry. Default: 3.
    pub max_attempts: u32,
    /// Delay before the first retry. Default: 2s.
    pub initial_delay: Duration,
    /// Upper bound for any single delay, server hints included. Default: 30s.
    pub max_delay: Duration,
    /// Default: fixed.
    pub backoff: Backoff,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that disables retries (single attempt).
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Set maximum attempts (including the initial request).
    pub fn max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay after the given attempt (0-indexed) failed.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            Backoff::Fixed => self.initial_delay,
            Backoff::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Delay respecting a server `retry_after` hint, still capped at `max_delay`.
    pub fn effective_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        retry_after
            .map(|hint| hint.min(self.max_delay))
            .unwrap_or_else(|| self.delay_for_attempt(attempt))
    }
}

/// Execute an async operation with retry logic.
///
/// Retries transient errors (see [`HuginnError::is_transient()`]) up to
/// `config.max_attempts` total attempts. Permanent errors, including
/// `NotFound`, are returned immediately.
pub async fn with_retry<F, Fut, T>(config: &RetryConfig, operation: &str, f: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut last_err = None;
    for attempt in 0..max_attempts {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                if attempt + 1 < max_attempts {
                    metrics::counter!(telemetry::RETRIES_TOTAL, "operation" => operation.to_owned())
                        .increment(1);
                    let delay = config.effective_delay(attempt, e.retry_after());
                    warn!(
                        operation,
                        attempt = attempt + 1,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying after transient error"
                    );
                    tokio::time::sleep(delay).await;
                }
                last_err = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
    Err(last_err.unwrap_or(HuginnError::Http(format!(
        "{operation}: retries exhausted"
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_is_constant() {
        let config = RetryConfig::new().initial_delay(Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(2));
        assert_eq!(config.delay_for_attempt(5), Duration::from_secs(2));
    }

    #[test]
    fn exponential_backoff_is_capped() {
        let config = RetryConfig::new()
            .backoff(Backoff::Exponential)
            .initial_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(500));
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(500));
    }

    #[test]
    fn retry_after_hint_wins_but_is_capped() {
        let config = RetryConfig::new().max_delay(Duration::from_secs(10));
        assert_eq!(
            config.effective_delay(0, Some(Duration::from_secs(4))),
            Duration::from_secs(4)
        );
        assert_eq!(
            config.effective_delay(0, Some(Duration::from_secs(3600))),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn max_attempts_never_drops_below_one() {
        assert_eq!(RetryConfig::new().max_attempts(0).max_attempts, 1);
    }
}
