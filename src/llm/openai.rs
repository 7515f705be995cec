use super::common::{build_openai_messages, extract_openai_response};
use super::{LlmError, LlmProvider};
use crate::config::Settings;
use async_openai::{config::OpenAIConfig, types::chat::CreateChatCompletionRequestArgs, Client};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use std::time::Duration;

/// LLM provider implementation for `OpenAI` and compatible APIs
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
}

impl OpenAiProvider {
    /// Create a new provider instance
    #[must_use]
    pub fn new(api_key: String, api_base: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self {
            client: Client::with_config(config).with_backoff(single_attempt()),
        }
    }

    /// Create a provider from application settings
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.openai_api_key.clone(),
            settings.openai_api_base.clone(),
        )
    }
}

/// Backoff that gives up after the first failure, so 5xx and 429 answers
/// surface as errors instead of being retried by the client
fn single_attempt() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..ExponentialBackoff::default()
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        model_id: &str,
    ) -> Result<String, LlmError> {
        let messages = build_openai_messages(system_prompt, user_message)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model_id)
            .messages(messages)
            .build()
            .map_err(|e| LlmError::Unknown(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        extract_openai_response(&response)
    }
}
