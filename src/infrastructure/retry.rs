//! Bounded retry for chain calls.
//!
//! [`RetryPolicy`] wraps one logical RPC operation and retries it with
//! exponential backoff while the error is retryable. Contract reverts and
//! other terminal errors are returned on the first occurrence.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::ChainError;
use crate::infrastructure::config::retry::RetryConfig;

type RetryPredicate = Arc<dyn Fn(&ChainError) -> bool + Send + Sync>;

/// Retry strategy for a single chain call.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter: bool,
    retryable: RetryPredicate,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("multiplier", &self.multiplier)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Build a policy from `[retry]` settings. Only transient errors retry.
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
            multiplier: config.backoff_multiplier.max(1.0),
            jitter: config.jitter,
            retryable: Arc::new(ChainError::is_transient),
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier.max(1.0);
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replace the retryable-error predicate.
    #[must_use]
    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ChainError) -> bool + Send + Sync + 'static,
    {
        self.retryable = Arc::new(predicate);
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Base delay after the given failed attempt (1-based), before jitter.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let millis = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff_for(attempt);
        if !self.jitter {
            return base;
        }
        // Up to 20% on top of the base delay.
        let range = (base.as_millis() as u64) / 5;
        if range == 0 {
            return base;
        }
        base + Duration::from_millis(rand::thread_rng().gen_range(0..=range))
    }

    /// Whether the policy would retry this error at all.
    #[must_use]
    pub fn is_retryable(&self, error: &ChainError) -> bool {
        (self.retryable)(error)
    }

    /// Run `operation` until it succeeds, fails terminally, or attempts run out.
    ///
    /// The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ChainError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ChainError>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(call = label, attempt, "Chain call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) if attempt < self.max_attempts && self.is_retryable(&error) => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        call = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying chain call"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
