//! HTTP client for OpenAI-compatible chat completion endpoints.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::LlmError;
use super::types::{ChatRequest, ChatResponse};

/// A backend that can answer chat completion requests. The session layer
/// depends on this trait so it can be exercised without a live endpoint.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// reqwest-based client for any host speaking the OpenAI chat format
/// (OpenAI, Azure OpenAI, GitHub Models, Ollama).
pub struct ChatClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %request.model, messages = request.messages.len(), "sending completion request");

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }

        let response = req.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}
