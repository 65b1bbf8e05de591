/*!
 * Translation service for subtitle translation using AI providers.
 *
 * This module contains the core functionality for translating subtitles.
 * It is split into several submodules:
 *
 * - `core`: The batch orchestrator and its retry loop
 * - `batch`: Batch splitting and prompt serialization
 * - `parser`: Decoding of model output
 * - `prompts`: The shared instruction template
 * - `rate_limit`: Requests-per-minute pacing
 * - `retry`: Backoff policy
 * - `cancellation`: Cooperative cancellation
 * - `sink`: Injected logging
 */

// Re-export main types for easier usage
pub use self::cancellation::CancellationSignal;
pub use self::core::TranslationService;
pub use self::rate_limit::{RateLimitError, RateLimiter};
pub use self::retry::RetryPolicy;
pub use self::sink::{CaptureSink, LogEntry, LogFacadeSink, LogSink, NullSink};

// Submodules
pub mod batch;
pub mod cancellation;
pub mod core;
pub mod parser;
pub mod prompts;
pub mod rate_limit;
pub mod retry;
pub mod sink;
