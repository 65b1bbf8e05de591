/*!
 * OpenRouter backend.
 *
 * Speaks the OpenAI chat completion format, but checks the API key before
 * every request and maps OpenRouter's credit, moderation and upstream
 * errors to their own variants.
 */

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::openai::{ChatClient, ChatRequest};
use crate::providers::{classify_status, read_error, Provider};
use crate::translation::sink::LogSink;

/// Response of `GET /auth/key`
#[derive(Debug, Clone, Deserialize)]
pub struct KeyInfo {
    pub data: KeyData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyData {
    #[serde(default)]
    pub label: Option<String>,
    /// Credits used so far
    #[serde(default)]
    pub usage: f64,
    /// Credit limit, `None` when unlimited
    #[serde(default)]
    pub limit: Option<f64>,
    #[serde(default)]
    pub is_free_tier: bool,
    #[serde(default)]
    pub rate_limit: Option<KeyRateLimit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyRateLimit {
    pub requests: u64,
    pub interval: String,
}

impl fmt::Display for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = &self.data;
        write!(f, "credits used {:.4}", data.usage)?;
        match data.limit {
            Some(limit) => write!(f, ", limit {limit:.4}")?,
            None => write!(f, ", no limit")?,
        }
        write!(f, ", free tier {}", data.is_free_tier)?;
        if let Some(rate_limit) = &data.rate_limit {
            write!(f, ", rate limit {} per {}", rate_limit.requests, rate_limit.interval)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct OpenRouterErrorEnvelope {
    error: OpenRouterErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenRouterErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ModerationMetadata {
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    flagged_input: Option<String>,
}

fn parse_error_body(body: &str) -> Option<OpenRouterErrorBody> {
    serde_json::from_str::<OpenRouterErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error)
}

/// Moderation details from a 403 body, found either under
/// `metadata.moderation` or directly in `metadata`
fn moderation_details(metadata: &serde_json::Value) -> Option<ModerationMetadata> {
    let candidate = metadata.get("moderation").unwrap_or(metadata);
    serde_json::from_value::<ModerationMetadata>(candidate.clone())
        .ok()
        .filter(|details| !details.reasons.is_empty())
}

/// Map an OpenRouter error status to the shared taxonomy
pub fn classify_openrouter_status(status_code: u16, body: &str) -> ProviderError {
    let parsed = parse_error_body(body);
    let message = parsed
        .as_ref()
        .map(|error| error.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    match status_code {
        429 => ProviderError::RateLimited(message),
        402 => ProviderError::InsufficientCredits(message),
        403 => {
            let details = parsed
                .as_ref()
                .and_then(|error| error.metadata.as_ref())
                .and_then(moderation_details);
            match details {
                Some(details) => {
                    let mut description = format!("reasons: {}", details.reasons.join(", "));
                    if let Some(flagged) = details.flagged_input {
                        description.push_str(&format!("; flagged input: {flagged}"));
                    }
                    ProviderError::ContentRejected(description)
                }
                None => ProviderError::ContentRejected(message),
            }
        }
        502 => {
            let provider_name = parsed
                .as_ref()
                .and_then(|error| error.metadata.as_ref())
                .and_then(|metadata| metadata.get("provider_name"))
                .and_then(|name| name.as_str())
                .map(str::to_string);
            ProviderError::ApiError {
                status_code,
                message: match provider_name {
                    Some(name) => format!("upstream provider {name} failed: {message}"),
                    None => format!("upstream provider failed: {message}"),
                },
            }
        }
        _ => classify_status(status_code, body),
    }
}

/// OpenRouter gateway backend
pub struct OpenRouter {
    chat: ChatClient,
    model: String,
    verbose: bool,
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for OpenRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouter")
            .field("chat", &self.chat)
            .field("model", &self.model)
            .field("verbose", &self.verbose)
            .finish()
    }
}

impl OpenRouter {
    /// Create a new OpenRouter provider
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        verbose: bool,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            chat: ChatClient::new(client, endpoint, Some(api_key.into())),
            model: model.into(),
            verbose,
            sink,
        }
    }

    /// Fetch usage and limits of the configured key
    pub async fn key_info(&self) -> Result<KeyInfo, ProviderError> {
        let url = format!("{}/auth/key", self.chat.endpoint());
        let mut builder = self.chat.http().get(&url);
        if let Some(api_key) = self.chat.api_key() {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(read_error(response, classify_status).await);
        }

        response
            .json::<KeyInfo>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(format!("failed to parse key info: {e}")))
    }
}

#[async_trait]
impl Provider for OpenRouter {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn translate_batch(
        &self,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let key_info = self.key_info().await?;
        if self.verbose {
            self.sink.debug(format!("OpenRouter key info: {key_info}"));
        }

        let request = ChatRequest::translation(&self.model, batch_text, source_language, target_language);
        self.chat
            .complete_with(&request, classify_openrouter_status)
            .await?
            .into_text()
    }
}
