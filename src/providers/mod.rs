/*!
 * Provider implementations for different translation backends.
 *
 * This module contains client implementations for the supported services:
 * - OpenAI: chat completions API
 * - OpenRouter: OpenAI-compatible gateway with credit and moderation checks
 * - Google AI: Gemini `generateContent`
 * - LM Studio: OpenAI-compatible local server
 *
 * Providers perform exactly one request per call and never retry; they only
 * translate failures into `ProviderError` so the translation service can
 * decide what to do.
 */

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{Backend, ServiceConfig};
use crate::errors::ProviderError;
use crate::translation::sink::LogSink;

/// Common trait for all translation backends
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Translate one serialized batch
    ///
    /// # Arguments
    /// * `batch_text` - Numbered subtitles joined by the separator
    /// * `source_language` - Source language label
    /// * `target_language` - Target language label
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The raw model output or a classified error
    async fn translate_batch(
        &self,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

/// Build the provider for the configured backend
///
/// The configuration is expected to be validated already.
pub fn create_provider(
    config: &ServiceConfig,
    client: reqwest::Client,
    sink: Arc<dyn LogSink>,
) -> Box<dyn Provider> {
    let endpoint = config.endpoint();
    match config.backend {
        Backend::OpenAI => Box::new(openai::OpenAI::new(
            client,
            endpoint,
            config.api_key.clone(),
            config.model.clone(),
        )),
        Backend::OpenRouter => Box::new(openrouter::OpenRouter::new(
            client,
            endpoint,
            config.api_key.clone(),
            config.model.clone(),
            config.verbose,
            sink,
        )),
        Backend::GoogleAI => Box::new(google::GoogleAI::new(
            client,
            endpoint,
            config.api_key.clone(),
            config.model.clone(),
        )),
        Backend::LMStudio => Box::new(lmstudio::LMStudio::new(
            client,
            endpoint,
            config.api_key.clone(),
            config.model.clone(),
        )),
    }
}

// Error envelope used by OpenAI-compatible APIs and Google AI alike
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Best human-readable message from an error body
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let message = envelope.error.message.unwrap_or_default();
            match envelope.error.status {
                Some(status) if !message.contains(&status) => format!("{status}: {message}"),
                _ => message,
            }
        }
        Err(_) => body.trim().to_string(),
    }
}

/// Map a non-success HTTP status to the shared error taxonomy
pub(crate) fn classify_status(status_code: u16, body: &str) -> ProviderError {
    let message = error_message(body);
    match status_code {
        401 | 403 => ProviderError::AuthenticationError(message),
        402 => ProviderError::InsufficientCredits(message),
        429 => ProviderError::RateLimited(message),
        _ => ProviderError::ApiError {
            status_code,
            message,
        },
    }
}

/// Read a failed response and classify it with `classify`
pub(crate) async fn read_error<F>(response: reqwest::Response, classify: F) -> ProviderError
where
    F: FnOnce(u16, &str) -> ProviderError,
{
    let status_code = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to get error response text".to_string());
    classify(status_code, &body)
}

pub mod google;
pub mod lmstudio;
pub mod mock;
pub mod openai;
pub mod openrouter;
