//! LLM provider and question answering
//!
//! Wraps a chat-completion API behind [`LlmProvider`] and answers free-text
//! questions with a fixed system prompt.

mod common;
mod openai;

pub use openai::OpenAiProvider;

use crate::config::SYSTEM_PROMPT;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Errors that can occur during LLM operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// Error returned by the provider's API
    #[error("API error: {0}")]
    ApiError(String),
    /// Provider did not answer in time
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    /// Any other unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Interface for chat-completion providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a single completion for one user message
    async fn chat_completion(
        &self,
        system_prompt: &str,
        user_message: &str,
        model_id: &str,
    ) -> Result<String, LlmError>;
}

/// Answers news questions, one independent request per call
pub struct AiResponder {
    provider: Arc<dyn LlmProvider>,
    model_id: String,
    timeout: Duration,
}

impl AiResponder {
    /// Create a responder using the given provider and model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, model_id: String, timeout_secs: u64) -> Self {
        Self {
            provider,
            model_id,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Forward the user's text verbatim and return the first answer.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Timeout` if the provider does not answer in time,
    /// or any error from the provider.
    #[instrument(skip(self, user_text), fields(model = %self.model_id))]
    pub async fn answer_question(&self, user_text: &str) -> Result<String, LlmError> {
        debug!(chars = user_text.chars().count(), "Forwarding question");

        tokio::time::timeout(
            self.timeout,
            self.provider
                .chat_completion(SYSTEM_PROMPT, user_text, &self.model_id),
        )
        .await
        .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?
    }
}
