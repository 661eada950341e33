//! Inference backend abstraction and the Ollama chat client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::GenerationError;
use crate::models::{ChatMessage, ChatRequest, ChatResponse};

/// Anything that can turn a conversation into generated text.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Runs one chat completion and returns the reply content.
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, GenerationError>;

    /// Cheap liveness probe.
    async fn health(&self) -> bool;
}

// Single Ollama server
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl InferenceBackend for OllamaBackend {
    #[instrument(skip(self, messages), fields(model = %self.model, message_count = messages.len()))]
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let res = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.bytes().await?;
        let reply: ChatResponse = serde_json::from_slice(&body)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        let content = reply
            .message
            .ok_or_else(|| GenerationError::Malformed("missing `message`".to_string()))?
            .content
            .ok_or_else(|| GenerationError::Malformed("missing `message.content`".to_string()))?;

        debug!(reply_len = content.len(), "Ollama reply received");
        Ok(content)
    }

    async fn health(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url); // Ollama health endpoint
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(res) => res.status().is_success(),
            Err(_) => false,
        }
    }
}
