use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::LLMConfig;
use crate::types::{AppResult, LLMMessage, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Text-completion oracle shared by every pipeline step.
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    model: String,
}

impl LLM {
    pub fn new(adapter: Arc<dyn LLMAdapter>, model: impl Into<String>) -> Self {
        Self {
            adapter,
            model: model.into(),
        }
    }

    /// Build the OpenAI-compatible oracle described by `config`.
    pub fn from_config(config: &LLMConfig) -> AppResult<Self> {
        let adapter = crate::llm::openai::OpenAIAdapter::from_config(config)?;
        Ok(Self::new(Arc::new(adapter), config.model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }

    /// One system + user round trip, returning the reply text.
    pub async fn complete(&self, system: &str, user: &str, temperature: f32) -> AppResult<String> {
        let request = LLMRequest {
            model: self.model.clone(),
            messages: vec![LLMMessage::system(system), LLMMessage::user(user)],
            temperature: Some(temperature),
        };

        debug!(model = %self.model, prompt_len = user.len(), temperature, "Calling oracle");
        let response = self.create_chat_completion(&request).await?;
        Ok(response.content)
    }
}

/// Answers every request with the same reply.
#[cfg(test)]
pub(crate) struct StaticAdapter(pub String);

#[cfg(test)]
#[async_trait]
impl LLMAdapter for StaticAdapter {
    async fn create_chat_completion(&self, _request: &LLMRequest) -> AppResult<LLMResponse> {
        Ok(LLMResponse {
            content: self.0.clone(),
            finish_reason: Some("stop".to_string()),
        })
    }
}

#[cfg(test)]
pub(crate) fn static_llm(reply: &str) -> LLM {
    LLM::new(Arc::new(StaticAdapter(reply.to_string())), "test-model")
}
