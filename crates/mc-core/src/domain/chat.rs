//! Chat request types for the gateway relay.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::GatewayConfig;

/// One turn of a conversation, kept exactly as the client sent it.
///
/// Only the object shape is enforced; `content` may be a string, null or a
/// part list, and fields such as `tool_calls` or `name` ride along.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatMessage(Map<String, Value>);

impl ChatMessage {
    /// Plain text turn.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("role".to_string(), Value::String(role.into()));
        fields.insert("content".to_string(), Value::String(content.into()));
        Self(fields)
    }

    pub fn role(&self) -> Option<&str> {
        self.0.get("role").and_then(Value::as_str)
    }

    /// `None` when the key is absent; `Some(Value::Null)` when sent as null.
    pub fn content(&self) -> Option<&Value> {
        self.0.get("content")
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Why an inbound chat body was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatRequestError {
    /// Body was not valid JSON or had the wrong shape.
    #[error("Invalid chat request body: {0}")]
    InvalidJson(String),

    /// `messages` was absent or null.
    #[error("Missing conversation: `messages` must be a list of role/content pairs")]
    MissingMessages,
}

#[derive(Deserialize)]
struct RawChatRequest {
    messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    stream: bool,
}

/// Validated inbound chat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

impl ChatRequest {
    /// Parse and validate a raw request body.
    ///
    /// An empty list is accepted; an absent one is not.
    pub fn from_slice(body: &[u8]) -> Result<Self, ChatRequestError> {
        let raw: RawChatRequest = serde_json::from_slice(body)
            .map_err(|e| ChatRequestError::InvalidJson(e.to_string()))?;
        let messages = raw.messages.ok_or(ChatRequestError::MissingMessages)?;
        Ok(Self {
            messages,
            stream: raw.stream,
        })
    }

    /// Build the payload forwarded to the gateway.
    #[must_use]
    pub fn to_gateway_payload<'a>(&'a self, config: &'a GatewayConfig) -> GatewayChatPayload<'a> {
        GatewayChatPayload {
            model: &config.model,
            messages: &self.messages,
            stream: self.stream,
            user: &config.user,
        }
    }
}

/// Body of `POST /v1/chat/completions` on the gateway.
#[derive(Debug, Serialize)]
pub struct GatewayChatPayload<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub user: &'a str,
}
