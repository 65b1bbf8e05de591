use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{classify_status, error_message, read_error, Provider};
use crate::translation::prompts::render_translation_prompt;

// Finish reasons that mean the candidate was withheld
const BLOCKING_FINISH_REASONS: [&str; 4] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST", "SPII"];

/// Text part of a content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// Content block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// `generateContent` request body
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Single-turn request carrying `prompt` as user text
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(prompt.into()) }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// `generateContent` response body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, classifying blocked and empty answers
    pub fn into_text(self) -> Result<String, ProviderError> {
        if let Some(reason) = self.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(ProviderError::ContentRejected(format!("prompt blocked: {reason}")));
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ProviderError::EmptyResponse("no response from Google AI".to_string()));
        };

        let parts = candidate.content.map(|content| content.parts).unwrap_or_default();
        if parts.is_empty() {
            return match candidate.finish_reason {
                Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) => {
                    Err(ProviderError::ContentRejected(format!("response blocked: {reason}")))
                }
                _ => Err(ProviderError::EmptyResponse("empty response from Google AI".to_string())),
            };
        }

        let text: String = parts.into_iter().filter_map(|part| part.text).collect();
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse("empty response from Google AI".to_string()));
        }
        Ok(text)
    }
}

/// Map a Google AI error status to the shared taxonomy
pub fn classify_google_status(status_code: u16, body: &str) -> ProviderError {
    let message = error_message(body);
    let lowered = message.to_lowercase();
    if status_code == 429
        || lowered.contains("resource_exhausted")
        || lowered.contains("resource exhausted")
        || lowered.contains("quota")
        || lowered.contains("rate limit")
    {
        return ProviderError::RateLimited(message);
    }
    if lowered.contains("api key not valid") {
        return ProviderError::AuthenticationError(message);
    }
    classify_status(status_code, body)
}

/// Google AI (Gemini) backend
#[derive(Debug)]
pub struct GoogleAI {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GoogleAI {
    /// Create a new Google AI provider
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.trim_start_matches("models/").to_string(),
        }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Send one `generateContent` request
    pub async fn generate(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse, ProviderError> {
        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(read_error(response, classify_google_status).await);
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.without_url().to_string()))
    }
}

#[async_trait]
impl Provider for GoogleAI {
    fn name(&self) -> &'static str {
        "googleai"
    }

    async fn translate_batch(
        &self,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let prompt = render_translation_prompt(source_language, target_language, batch_text);
        self.generate(&GenerateContentRequest::from_prompt(prompt))
            .await?
            .into_text()
    }
}
