use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{classify_status, read_error, Provider};
use crate::translation::prompts::render_translation_prompt;

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion request shared by all OpenAI-compatible backends
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }

    /// The translation request every chat backend sends: the rendered
    /// instructions and batch as one system message
    pub fn translation(
        model: impl Into<String>,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Self {
        Self::new(model).add_message(
            "system",
            render_translation_prompt(source_language, target_language, batch_text),
        )
    }
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct Usage {
    /// Number of prompt tokens
    pub prompt_tokens: u64,
    /// Number of completion tokens
    pub completion_tokens: u64,
    /// Total number of tokens
    pub total_tokens: u64,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct Choice {
    /// The message content
    pub message: ChatMessage,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// The generated choices
    #[serde(default)]
    pub choices: Vec<Choice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Text of the first choice, or `EmptyResponse` if there is none
    pub fn into_text(self) -> Result<String, ProviderError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse(
                "model generated no content (possibly warming up)".to_string(),
            ));
        }
        Ok(content)
    }
}

/// HTTP client for OpenAI-compatible chat completion endpoints
#[derive(Debug, Clone)]
pub struct ChatClient {
    /// Shared HTTP client
    client: Client,
    /// API base, e.g. `https://api.openai.com/v1`
    endpoint: String,
    /// Bearer token; `None` sends no authorization header
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Send a completion request and return the raw response, whatever its status
    pub async fn send(&self, request: &ChatRequest) -> Result<reqwest::Response, ProviderError> {
        let api_url = format!("{}/chat/completions", self.endpoint);

        let mut builder = self.client.post(&api_url).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        Ok(builder.send().await?)
    }

    /// Complete a chat request, mapping failures with `classify`
    pub async fn complete_with<F>(&self, request: &ChatRequest, classify: F) -> Result<ChatResponse, ProviderError>
    where
        F: FnOnce(u16, &str) -> ProviderError,
    {
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(read_error(response, classify).await);
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.without_url().to_string()))
    }

    /// Complete a chat request with the shared status mapping
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.complete_with(request, classify_status).await
    }
}

/// OpenAI chat completions backend
#[derive(Debug)]
pub struct OpenAI {
    chat: ChatClient,
    model: String,
}

impl OpenAI {
    /// Create a new OpenAI provider
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            chat: ChatClient::new(client, endpoint, Some(api_key.into())),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Provider for OpenAI {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn translate_batch(
        &self,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest::translation(&self.model, batch_text, source_language, target_language);
        self.chat.complete(&request).await?.into_text()
    }
}
