/*!
 * Requests-per-minute pacing for outbound provider calls.
 *
 * One limiter belongs to one `TranslationService`. With a ceiling of `rpm`
 * requests per minute every grant is spaced `60s / rpm` after the previous
 * one; the first grant is immediate. An `rpm` of zero disables pacing.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Interval, MissedTickBehavior};

use super::cancellation::CancellationSignal;

/// Rate limiter errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitError {
    /// The caller cancelled while waiting for a slot
    #[error("rate limit wait cancelled")]
    Cancelled,

    /// `close` was called on this limiter
    #[error("rate limiter is closed")]
    Closed,
}

/// Interval-based gate bounding requests per minute
#[derive(Debug)]
pub struct RateLimiter {
    interval: Option<Duration>,
    // Created on first use so the limiter can be built outside a runtime
    ticker: Mutex<Option<Interval>>,
    closed: AtomicBool,
}

impl RateLimiter {
    /// Create a limiter for `rpm` requests per minute (0 = unlimited)
    pub fn new(rpm: u32) -> Self {
        let interval = (rpm > 0).then(|| Duration::from_secs(60) / rpm);
        Self {
            interval,
            ticker: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Spacing between grants, `None` when unlimited
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn is_unlimited(&self) -> bool {
        self.interval.is_none()
    }

    /// Wait for the next slot.
    ///
    /// Callers are served one at a time; each waits until a full interval has
    /// passed since the previous grant.
    pub async fn acquire(&self, cancel: &CancellationSignal) -> Result<(), RateLimitError> {
        let Some(period) = self.interval else {
            return Ok(());
        };
        if self.closed.load(Ordering::SeqCst) {
            return Err(RateLimitError::Closed);
        }

        let mut guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RateLimitError::Cancelled),
            guard = self.ticker.lock() => guard,
        };

        if self.closed.load(Ordering::SeqCst) {
            return Err(RateLimitError::Closed);
        }

        let ticker = guard.get_or_insert_with(|| {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RateLimitError::Cancelled),
            _ = ticker.tick() => Ok(()),
        }
    }

    /// Stop the underlying timer. Safe to call repeatedly, or on a limiter
    /// that never granted anything.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        // A held lock keeps its ticker until dropped; `closed` already refuses grants
        if let Ok(mut guard) = self.ticker.try_lock() {
            guard.take();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.close();
    }
}
