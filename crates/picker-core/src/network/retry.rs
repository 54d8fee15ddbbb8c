//! Retry helper for feed page fetches.
//!
//! The feed retries a failed page a fixed number of times before surfacing
//! the error. Delays double per attempt (1s, 2s, 4s, ...) up to a cap, which
//! mirrors the default behaviour of common data-fetching layers. This is the
//! only retry the crate performs; there is no unbounded retry loop.

use crate::config::FeedConfig;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// How many times, and how patiently, a failed fetch is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Spread delays by a random factor in `0.5..1.5`.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_retry_count(FeedConfig::RETRY_COUNT)
    }
}

impl RetryPolicy {
    /// Policy that retries `retries` times after the first attempt.
    pub fn from_retry_count(retries: u32) -> Self {
        Self {
            max_attempts: retries + 1,
            base_delay: FeedConfig::RETRY_BASE_DELAY,
            max_delay: Duration::from_secs(30),
            jitter: false,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::from_retry_count(0)
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay before retry number `attempt` (0-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2f64.powi(attempt as i32);
        let capped = (self.base_delay.as_secs_f64() * multiplier).min(self.max_delay.as_secs_f64());

        let secs = if self.jitter {
            let factor = rand::rng().random_range(0.5..1.5);
            (capped * factor).min(self.max_delay.as_secs_f64())
        } else {
            capped
        };

        Duration::from_secs_f64(secs)
    }
}

/// Outcome bookkeeping for a retried operation.
#[derive(Debug, Clone, Default)]
pub struct RetryStats {
    pub attempts: u32,
    pub total_delay: Duration,
    pub last_error: Option<String>,
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's attempts are exhausted.
pub async fn retry_async<F, Fut, T, E>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
) -> (Result<T, E>, RetryStats)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut stats = RetryStats::default();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        stats.attempts = attempt + 1;

        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "fetch succeeded after retry");
                }
                return (Ok(value), stats);
            }
            Err(e) => e,
        };

        stats.last_error = Some(err.to_string());

        if !should_retry(&err) {
            debug!(error = %err, "error is not retryable");
            return (Err(err), stats);
        }
        if attempt + 1 >= max_attempts {
            warn!(attempts = max_attempts, error = %err, "all fetch attempts exhausted");
            return (Err(err), stats);
        }

        let delay = policy.delay_for(attempt);
        stats.total_delay += delay;
        warn!(
            attempt = attempt + 1,
            max_attempts,
            error = %err,
            "fetch failed, retrying in {:?}",
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
