//! Chat service transport — the remote API the session store talks to.
//!
//! DESIGN
//! ======
//! `ChatService` is the seam between the store and the network. The store
//! only ever holds an `Arc<dyn ChatService>`, so tests swap in mocks and
//! the binary wires in [`HttpChatService`]. Retry and backoff are left to
//! callers; this layer issues exactly one HTTP request per call.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ChatClientConfig;
use crate::types::{ChatError, ChatHistoryPage, ChatMessage, ChatResponse};

// =============================================================================
// TRAIT
// =============================================================================

/// Remote chat backend. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    /// Send one user message and wait for the complete answer.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on transport failure or a non-success status.
    async fn send_message(&self, message: &ChatMessage) -> Result<ChatResponse, ChatError>;

    /// Fetch up to `limit` history entries for a user, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`ChatError`] on transport failure or a non-success status.
    async fn get_chat_history(
        &self,
        user_id: i64,
        course_id: Option<i64>,
        conversation_id: Option<&str>,
        limit: usize,
    ) -> Result<ChatHistoryPage, ChatError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// `reqwest`-backed [`ChatService`].
pub struct HttpChatService {
    http: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpChatService {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &ChatClientConfig) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ChatError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), api_token: config.api_token.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ChatError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "chat POST");
        let request = self.authorize(self.http.post(url)).json(body);
        execute(request).await
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ChatError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, params = query.len(), "chat GET");
        let request = self.authorize(self.http.get(url)).query(query);
        execute(request).await
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

async fn execute<T>(request: reqwest::RequestBuilder) -> Result<T, ChatError>
where
    T: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|e| ChatError::ApiRequest(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ChatError::ApiRequest(e.to_string()))?;
    if !status.is_success() {
        return Err(ChatError::ApiResponse { status: status.as_u16(), body: text });
    }
    serde_json::from_str(&text).map_err(|e| ChatError::ApiParse(e.to_string()))
}

#[async_trait::async_trait]
impl ChatService for HttpChatService {
    async fn send_message(&self, message: &ChatMessage) -> Result<ChatResponse, ChatError> {
        self.post_json("/chat", message).await
    }

    async fn get_chat_history(
        &self,
        user_id: i64,
        course_id: Option<i64>,
        conversation_id: Option<&str>,
        limit: usize,
    ) -> Result<ChatHistoryPage, ChatError> {
        let query = history_query(user_id, course_id, conversation_id, limit);
        self.get_json("/chat/history", &query).await
    }
}

/// Query parameters for the history endpoint. Unset filters are omitted.
pub(crate) fn history_query(
    user_id: i64,
    course_id: Option<i64>,
    conversation_id: Option<&str>,
    limit: usize,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("user_id", user_id.to_string()), ("limit", limit.to_string())];
    if let Some(course_id) = course_id {
        query.push(("course_id", course_id.to_string()));
    }
    if let Some(conversation_id) = conversation_id {
        query.push(("conversation_id", conversation_id.to_string()));
    }
    query
}

#[cfg(test)]
#[path = "service_test.rs"]
mod tests;
