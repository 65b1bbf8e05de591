/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, which splits subtitles into
 * batches, paces requests through the rate limiter, and owns the single
 * retry loop every backend shares.
 */

use std::sync::Arc;
use std::time::Duration;

use crate::app_config::ServiceConfig;
use crate::errors::{ErrorDisposition, ProviderError, TranslationError};
use crate::providers::{create_provider, Provider};
use crate::subtitle_processor::SubtitleEntry;

use super::batch::{split_into_batches, Batch};
use super::cancellation::CancellationSignal;
use super::parser::parse_response;
use super::rate_limit::{RateLimitError, RateLimiter};
use super::retry::RetryPolicy;
use super::sink::LogSink;

/// Main translation service for subtitle translation
pub struct TranslationService {
    /// Configuration the service was built from
    config: ServiceConfig,

    /// Backend implementation
    provider: Box<dyn Provider>,

    /// Request pacing
    limiter: RateLimiter,

    /// Backoff and attempt limit for failed batches
    retry_policy: RetryPolicy,

    /// Log destination
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("backend", &self.config.backend)
            .field("model", &self.config.model)
            .field("provider", &self.provider)
            .field("limiter", &self.limiter)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    ///
    /// Fails with `TranslationError::Configuration` when the configuration
    /// is incomplete (missing key or model, bad URL, zero batch size).
    pub fn new(config: ServiceConfig, sink: Arc<dyn LogSink>) -> Result<Self, TranslationError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslationError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let provider = create_provider(&config, client, sink.clone());
        Ok(Self::with_provider(config, provider, sink))
    }

    /// Create a service around an existing provider
    pub fn with_provider(config: ServiceConfig, provider: Box<dyn Provider>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            limiter: RateLimiter::new(config.rpm),
            config,
            provider,
            retry_policy: RetryPolicy::default(),
            sink,
        }
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Translate `units` from `source_language` to `target_language`.
    ///
    /// Batches are sent one after another. On success the result has the
    /// same length and order as the input with `translated_lines` filled in;
    /// if any batch fails for good nothing is returned.
    pub async fn translate(
        &self,
        units: &[SubtitleEntry],
        source_language: &str,
        target_language: &str,
        cancel: &CancellationSignal,
    ) -> Result<Vec<SubtitleEntry>, TranslationError> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        if cancel.is_cancelled() {
            return Err(TranslationError::Cancelled);
        }

        let total = units.len();
        let batches = split_into_batches(units, self.config.batch_size);
        self.sink.info(format!(
            "Translating {} subtitles from {} to {} in {} batch(es) using {} ({})",
            total,
            source_language,
            target_language,
            batches.len(),
            self.config.backend.display_name(),
            self.config.model
        ));

        let mut translated = Vec::with_capacity(total);
        for batch in &batches {
            let groups = self
                .translate_batch_with_retry(batch, source_language, target_language, cancel)
                .await?;

            if self.config.verbose {
                for (entry, lines) in batch.entries.iter().zip(&groups) {
                    self.sink.debug(format!(
                        "#{} original: {} | translated: {}",
                        entry.index,
                        entry.source_lines.join(" / "),
                        lines.join(" / ")
                    ));
                }
            }

            translated.extend(batch.with_translations(groups));

            let processed = translated.len();
            self.sink.progress(processed, total);
            self.sink.info(format!(
                "Batch {}/{} done: {} processed, {} remaining ({:.1}%)",
                batch.number + 1,
                batches.len(),
                processed,
                total - processed,
                processed as f64 * 100.0 / total as f64
            ));
        }

        Ok(translated)
    }

    /// Run one batch through the retry loop
    async fn translate_batch_with_retry(
        &self,
        batch: &Batch<'_>,
        source_language: &str,
        target_language: &str,
        cancel: &CancellationSignal,
    ) -> Result<Vec<Vec<String>>, TranslationError> {
        let batch_text = batch.serialize();
        let mut attempt: u32 = 0;

        loop {
            let error = match self
                .attempt_batch(batch, &batch_text, source_language, target_language, cancel)
                .await
            {
                Ok(groups) => return Ok(groups),
                Err(error) => error,
            };

            let attempts = attempt + 1;
            let batch_failed = |source: ProviderError| TranslationError::Batch {
                start: batch.start,
                end: batch.end(),
                attempts,
                source,
            };

            match error.disposition() {
                ErrorDisposition::Cancelled => return Err(TranslationError::Cancelled),
                ErrorDisposition::Fatal => {
                    self.sink.error(format!(
                        "Batch {}-{} failed with a non-retryable error: {}",
                        batch.start,
                        batch.end(),
                        error
                    ));
                    return Err(batch_failed(error));
                }
                ErrorDisposition::Retryable => {
                    if !self.retry_policy.should_retry(&error, attempt) {
                        return Err(batch_failed(error));
                    }

                    self.sink.warn(format!(
                        "Batch {}-{} attempt {}/{} failed: {}. Retrying in {:?}",
                        batch.start,
                        batch.end(),
                        attempts,
                        self.retry_policy.max_attempts,
                        error,
                        self.retry_policy.delay_for(attempt)
                    ));

                    if !self.retry_policy.backoff(attempt, cancel).await {
                        return Err(TranslationError::Cancelled);
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// One paced request plus response validation
    async fn attempt_batch(
        &self,
        batch: &Batch<'_>,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
        cancel: &CancellationSignal,
    ) -> Result<Vec<Vec<String>>, ProviderError> {
        self.limiter.acquire(cancel).await.map_err(|error| match error {
            RateLimitError::Cancelled => ProviderError::Cancelled,
            RateLimitError::Closed => ProviderError::Configuration(error.to_string()),
        })?;

        let raw = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            result = self.provider.translate_batch(batch_text, source_language, target_language) => result?,
        };

        let groups = parse_response(&raw, batch.len());
        if groups.len() != batch.len() {
            return Err(ProviderError::CountMismatch {
                expected: batch.len(),
                received: groups.len(),
            });
        }
        Ok(groups)
    }

    /// Stop the rate limiter; later translations fail fast
    pub fn close(&self) {
        self.limiter.close();
    }
}
