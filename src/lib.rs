/*!
 * # SRTran - subtitle translation with large language models
 *
 * A Rust library for translating SRT subtitles through AI backends.
 *
 * ## Features
 *
 * - Translate subtitles using various AI backends:
 *   - OpenAI API
 *   - OpenRouter (with key and credit checks)
 *   - Google AI (Gemini)
 *   - LM Studio (local, OpenAI-compatible)
 * - Batches of subtitles per request with positional markers
 * - Requests-per-minute pacing and exponential backoff
 * - Cooperative cancellation of in-flight work
 * - Preserve subtitle numbering and timing
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing and writing
 * - `translation`: Batch orchestration:
 *   - `translation::core`: The translation service and its retry loop
 *   - `translation::batch`: Batch splitting and serialization
 *   - `translation::parser`: Response decoding
 *   - `translation::rate_limit`: Request pacing
 * - `providers`: Client implementations for the backends:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::openrouter`: OpenRouter client
 *   - `providers::google`: Google AI client
 *   - `providers::lmstudio`: LM Studio client
 * - `app_controller`: File and folder workflow for the CLI
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the GNU General Public License v2.0 or later
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Backend, Config, ServiceConfig};
pub use errors::{AppError, ErrorDisposition, ProviderError, SubtitleError, TranslationError};
pub use language_utils::{display_language, get_language_name};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry, TranslationUnit};
pub use translation::{CancellationSignal, LogSink, TranslationService};
