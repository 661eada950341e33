use serde::{Deserialize, Serialize};

// Query string of POST /generate
#[derive(Deserialize, Debug, Clone)]
pub struct GenerateQuery {
    pub prompt: String,
}

// Success body of POST /generate
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerateResponse {
    pub response: String,
}

// Error body for every non-2xx from the gateway
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub detail: String,
}

// One turn of a chat conversation
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// Ollama /api/chat request format
#[derive(Serialize, Debug, Clone)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
}

// Ollama /api/chat response format; only `message.content` is required
#[derive(Deserialize, Debug, Clone)]
pub struct ChatResponse {
    pub message: Option<ChatReplyMessage>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChatReplyMessage {
    pub content: Option<String>,
}
