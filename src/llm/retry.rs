//! Bounded retry with exponential backoff for generator calls.

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::GenerationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt).
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry).
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }
}

/// Run `op` until it succeeds, fails permanently, or retries run out.
///
/// Only errors whose [`GenerationError::is_transient`] is true are retried.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, GenerationError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, GenerationError>>,
{
    let mut backoff = policy.initial_backoff;
    let mut attempt = 0u32;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                tracing::warn!(
                    "Generator call failed ({e}); retry {attempt}/{} in {:?}",
                    policy.max_retries,
                    backoff
                );
                tokio::time::sleep(backoff).await;
                backoff = next_backoff(backoff, policy.max_backoff);
            }
            Err(e) => return Err(e),
        }
    }
}

/// Double `current`, capped at `max`; saturates instead of overflowing.
fn next_backoff(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}
