/*!
 * Mock provider implementations for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always answers with a well-formed translation
 * - `MockProvider::fail_times(n, error)` - Fails `n` times, then works
 * - `MockProvider::failing(error)` - Always fails with an error
 * - `MockProvider::dropping_last()` - Answers with one subtitle missing
 *
 * Every call is recorded with its batch text and the (tokio) time it
 * arrived, so tests can assert on call counts, order and spacing.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::Instant;

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::parser::parse_response;
use crate::translation::prompts::SUBTITLE_SEPARATOR;

/// Request as seen by the mock
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// The serialized batch
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
    /// When the call arrived
    pub at: Instant,
}

impl MockRequest {
    /// Number of subtitles in the batch
    pub fn unit_count(&self) -> usize {
        parse_response(&self.text, usize::MAX).len()
    }
}

/// Factory for the error a failing mock returns
pub type ErrorFactory = fn() -> ProviderError;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy)]
pub enum MockBehavior {
    /// Always succeeds with a proper translation
    Working,
    /// Fails the first `failures` calls, then succeeds
    FailTimes { failures: usize, error: ErrorFactory },
    /// Fails only on call number `call` (0-based)
    FailOnCall { call: usize, error: ErrorFactory },
    /// Always fails with an error
    Failing(ErrorFactory),
    /// Answers with the last subtitle missing
    DropLast,
    /// Returns an empty string
    Empty,
    /// Simulates slow response (for cancellation testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Recorded requests, shared between clones
    requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that fails `failures` times before succeeding
    pub fn fail_times(failures: usize, error: ErrorFactory) -> Self {
        Self::new(MockBehavior::FailTimes { failures, error })
    }

    /// Create a mock that fails only on the given call
    pub fn fail_on_call(call: usize, error: ErrorFactory) -> Self {
        Self::new(MockBehavior::FailOnCall { call, error })
    }

    /// Create a failing mock provider that always errors
    pub fn failing(error: ErrorFactory) -> Self {
        Self::new(MockBehavior::Failing(error))
    }

    /// Create a mock whose answers are one subtitle short
    pub fn dropping_last() -> Self {
        Self::new(MockBehavior::DropLast)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that takes `delay_ms` to answer
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of recorded requests
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Well-formed response for `batch_text`: every line prefixed with the
    /// target language in brackets
    pub fn translate_text(batch_text: &str, target_language: &str) -> String {
        Self::respond(batch_text, target_language, 0)
    }

    fn respond(batch_text: &str, target_language: &str, drop: usize) -> String {
        let groups = parse_response(batch_text, usize::MAX);
        let keep = groups.len().saturating_sub(drop);

        groups
            .iter()
            .take(keep)
            .enumerate()
            .map(|(idx, lines)| {
                let translated: Vec<String> = lines
                    .iter()
                    .map(|line| format!("[{target_language}] {line}"))
                    .collect();
                format!("[{}]\n{}\n", idx + 1, translated.join("\n"))
            })
            .collect::<Vec<_>>()
            .join(&format!("{SUBTITLE_SEPARATOR}\n"))
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn translate_batch(
        &self,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(MockRequest {
            text: batch_text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            at: Instant::now(),
        });

        match self.behavior {
            MockBehavior::Working => Ok(Self::translate_text(batch_text, target_language)),

            MockBehavior::FailTimes { failures, error } => {
                if count < failures {
                    Err(error())
                } else {
                    Ok(Self::translate_text(batch_text, target_language))
                }
            }

            MockBehavior::FailOnCall { call, error } => {
                if count == call {
                    Err(error())
                } else {
                    Ok(Self::translate_text(batch_text, target_language))
                }
            }

            MockBehavior::Failing(error) => Err(error()),

            MockBehavior::DropLast => Ok(Self::respond(batch_text, target_language, 1)),

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::translate_text(batch_text, target_language))
            }
        }
    }
}
