//! Chat types — wire payloads, history records, and errors.
//!
//! Shapes match the chat backend's JSON contract: outbound [`ChatMessage`],
//! inbound [`ChatResponse`], and persisted turns as [`ChatHistory`].

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the chat store and its transport.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// No signed-in user was available for an operation that needs one.
    #[error("user not authenticated")]
    Unauthenticated,

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The HTTP request to the chat service failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The chat service returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The chat service response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Stable machine-readable codes for errors surfaced to callers.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::ConfigParse(_) => "E_CONFIG_PARSE",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::ApiResponse { .. } => "E_API_RESPONSE",
            Self::ApiParse(_) => "E_API_PARSE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// HISTORY
// =============================================================================

/// How the backend produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    /// The answer was grounded in retrieved course sources.
    Rag,
    /// Plain model answer with no retrieval context.
    General,
}

impl ContextType {
    /// Classify a response by its source list: any source means `Rag`.
    #[must_use]
    pub fn from_sources(sources: Option<&[String]>) -> Self {
        if sources.is_some_and(|s| !s.is_empty()) { Self::Rag } else { Self::General }
    }
}

/// One exchanged turn: a user message and the assistant's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistory {
    /// Server-assigned id, or a local millisecond timestamp for turns
    /// appended by this client before any history reload.
    pub id: i64,
    pub user_message: String,
    pub ai_response: String,
    /// Empty when no conversation has been assigned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub conversation_id: String,
    pub context_type: ContextType,
    /// ISO-8601 timestamp.
    pub created_at: String,
    /// ISO-8601 timestamp.
    pub response_time: String,
    #[serde(default)]
    pub course_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_rag_context: bool,
}

/// A page of history returned by the chat service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatHistoryPage {
    #[serde(default)]
    pub chats: Vec<ChatHistory>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// Outbound chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub message: String,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<i64>,
    /// Continuation hint. Omitted to let the server pick or start a conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// Inbound chat answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

impl ChatResponse {
    /// Sources attached to the answer, if any were returned and non-empty.
    #[must_use]
    pub fn non_empty_sources(&self) -> Option<&[String]> {
        self.sources.as_deref().filter(|s| !s.is_empty())
    }

    /// Conversation id assigned by the server. An empty string counts as none.
    #[must_use]
    pub fn assigned_conversation(&self) -> Option<&str> {
        self.conversation_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
