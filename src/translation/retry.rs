/*!
 * Retry policy for batch requests.
 *
 * The translation service owns the only retry loop; providers merely
 * classify their errors. This module decides how long to wait between
 * attempts and how many attempts a batch gets.
 */

use std::time::Duration;

use crate::errors::{ErrorDisposition, ProviderError};

use super::cancellation::CancellationSignal;

/// Attempts per batch on the general path
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Exponential backoff with a ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Delay after failed attempt `attempt` (0-indexed):
    /// `min(base * 2^attempt, max)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether another attempt should follow failed attempt `attempt`
    pub fn should_retry(&self, error: &ProviderError, attempt: u32) -> bool {
        error.disposition() == ErrorDisposition::Retryable && attempt + 1 < self.max_attempts
    }

    /// Sleep for the backoff after `attempt`, returning `false` if cancelled
    pub async fn backoff(&self, attempt: u32, cancel: &CancellationSignal) -> bool {
        let delay = self.delay_for(attempt);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}
