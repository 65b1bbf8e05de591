use async_trait::async_trait;
use reqwest::Client;

use crate::errors::ProviderError;
use crate::providers::openai::{ChatClient, ChatRequest};
use crate::providers::Provider;

/// LM Studio local server (OpenAI-compatible)
///
/// The server usually runs without authentication, so an empty API key
/// sends no authorization header at all.
#[derive(Debug)]
pub struct LMStudio {
    chat: ChatClient,
    model: String,
}

impl LMStudio {
    /// Create a new LM Studio provider
    pub fn new(client: Client, endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            chat: ChatClient::new(client, endpoint, Some(api_key.into())),
            model: model.into(),
        }
    }
}

#[async_trait]
impl Provider for LMStudio {
    fn name(&self) -> &'static str {
        "lmstudio"
    }

    async fn translate_batch(
        &self,
        batch_text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatRequest::translation(&self.model, batch_text, source_language, target_language);
        self.chat
            .complete(&request)
            .await
            .map_err(|error| match error {
                ProviderError::ConnectionError(message) => ProviderError::ConnectionError(format!(
                    "{message} (is the LM Studio server running at {}?)",
                    self.chat.endpoint()
                )),
                other => other,
            })?
            .into_text()
    }
}
