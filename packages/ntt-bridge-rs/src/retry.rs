//! Bounded retry with a fixed backoff
//!
//! Used around the transfer submission. Every failure is retried the same
//! way; after `max_retries` additional attempts the last error is returned.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Submission retry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Pause between attempts
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Check if we should retry after `attempt` (0-indexed) failed
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Total number of times the operation may run
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Execute with retry logic
///
/// `operation` receives the 0-based attempt number.
pub async fn with_retry<F, T, E, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0u32;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(attempt, "Succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if config.should_retry(attempt) => {
                warn!(
                    attempt = attempt + 1,
                    max = config.total_attempts(),
                    delay = ?config.delay,
                    error = %e,
                    "Attempt failed, retrying after delay"
                );
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
            Err(e) => {
                warn!(attempts = attempt + 1, error = %e, "Giving up after final attempt");
                return Err(e);
            }
        }
    }
}
