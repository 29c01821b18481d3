//! Chat session store — the in-memory state behind a chat view.
//!
//! DESIGN
//! ======
//! `ChatStore` owns a [`ChatState`] inside a `watch` channel: every mutation
//! goes through `send_modify`, so UI code can either read a snapshot or
//! `subscribe()` and redraw on change. Identity and transport are injected
//! (`IdentityProvider`, `ChatService`); the store never reaches for globals.
//!
//! ERROR HANDLING
//! ==============
//! `send_message` propagates failures to the caller after logging them.
//! `load_chat_history` logs and swallows failures: the caller only sees the
//! loading flag settle with `messages` untouched. Both paths always clear
//! `is_loading`, including when the future is dropped mid-request.
//!
//! CONCURRENCY
//! ===========
//! Overlapping calls are not serialized. Each call writes its results when
//! its response arrives, so the last completion wins, and the first call to
//! finish clears the shared loading flag.

use std::sync::Arc;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::auth::IdentityProvider;
use crate::config::DEFAULT_CHAT_HISTORY_LIMIT;
use crate::service::ChatService;
use crate::types::{ChatError, ChatHistory, ChatMessage, ChatResponse, ContextType};

// =============================================================================
// STATE
// =============================================================================

/// Session-local chat state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatState {
    /// Exchanged turns, oldest first.
    pub messages: Vec<ChatHistory>,
    pub current_conversation: Option<String>,
    pub is_loading: bool,
    /// Sources attached to the most recent answer that had any.
    pub sources: Vec<String>,
}

// =============================================================================
// STORE
// =============================================================================

pub struct ChatStore {
    service: Arc<dyn ChatService>,
    identity: Arc<dyn IdentityProvider>,
    history_limit: usize,
    state: watch::Sender<ChatState>,
}

impl ChatStore {
    #[must_use]
    pub fn new(service: Arc<dyn ChatService>, identity: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        Self { service, identity, history_limit: DEFAULT_CHAT_HISTORY_LIMIT, state }
    }

    /// Override the page size requested by [`Self::load_chat_history`].
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<ChatHistory> {
        self.state.borrow().messages.clone()
    }

    #[must_use]
    pub fn current_conversation(&self) -> Option<String> {
        self.state.borrow().current_conversation.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        self.state.borrow().sources.clone()
    }

    /// Watch for state changes. The receiver starts at the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Send a message on the current conversation and append the answered turn.
    ///
    /// The server's conversation id, when present, becomes the current one.
    /// Non-empty sources replace the stored sources.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Unauthenticated`] without touching state or the
    /// network when nobody is signed in; otherwise returns the transport
    /// error unchanged.
    pub async fn send_message(&self, message: &str, course_id: Option<i64>) -> Result<ChatHistory, ChatError> {
        let Some(user) = self.identity.current_user() else {
            return Err(ChatError::Unauthenticated);
        };

        let _loading = self.begin_loading();
        let conversation = self.current_conversation();
        let request = ChatMessage {
            message: message.to_owned(),
            user_id: user.id,
            course_id,
            conversation_id: conversation.clone(),
        };

        debug!(user_id = user.id, ?course_id, conversation = ?conversation, "sending chat message");
        let response = match self.service.send_message(&request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, user_id = user.id, "failed to send message");
                return Err(e);
            }
        };

        let entry = history_entry(message, course_id, &response, conversation.as_deref());
        self.state.send_modify(|state| {
            if let Some(id) = response.assigned_conversation() {
                if state.current_conversation.as_deref() != Some(id) {
                    info!(conversation = id, "conversation assigned");
                }
                state.current_conversation = Some(id.to_owned());
            }
            if let Some(sources) = response.non_empty_sources() {
                state.sources = sources.to_vec();
            }
            state.messages.push(entry.clone());
        });
        Ok(entry)
    }

    /// Replace `messages` with the user's stored history, oldest first.
    ///
    /// Does nothing when nobody is signed in. Transport failures are logged
    /// and leave `messages` as they were.
    pub async fn load_chat_history(&self, course_id: Option<i64>, conversation_id: Option<&str>) {
        let Some(user) = self.identity.current_user() else {
            debug!("history load skipped: not authenticated");
            return;
        };

        let _loading = self.begin_loading();
        let result = self
            .service
            .get_chat_history(user.id, course_id, conversation_id, self.history_limit)
            .await;

        match result {
            Ok(page) => {
                let mut chats = page.chats;
                chats.reverse();
                info!(user_id = user.id, count = chats.len(), "chat history loaded");
                self.state.send_modify(|state| state.messages = chats);
            }
            Err(e) => {
                warn!(error = %e, user_id = user.id, "failed to load chat history");
            }
        }
    }

    /// Drop all messages, sources, and the current conversation.
    pub fn clear_chat(&self) {
        self.state.send_modify(|state| {
            state.messages.clear();
            state.sources.clear();
            state.current_conversation = None;
        });
    }

    pub fn set_current_conversation(&self, conversation_id: Option<String>) {
        self.state.send_modify(|state| state.current_conversation = conversation_id);
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.state.send_modify(|state| state.is_loading = true);
        LoadingGuard { state: &self.state }
    }
}

/// Clears `is_loading` when a request finishes, fails, or is cancelled.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<ChatState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|state| state.is_loading = false);
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Build the turn recorded for an answered message.
///
/// The record's conversation falls back from the server's id to the id the
/// request was sent on, then to an empty string.
fn history_entry(
    message: &str,
    course_id: Option<i64>,
    response: &ChatResponse,
    sent_on: Option<&str>,
) -> ChatHistory {
    let now = OffsetDateTime::now_utc();
    let timestamp = now.format(&Rfc3339).unwrap_or_default();
    let context_type = ContextType::from_sources(response.sources.as_deref());
    ChatHistory {
        id: placeholder_id(now),
        user_message: message.to_owned(),
        ai_response: response.response.clone(),
        conversation_id: response
            .assigned_conversation()
            .or(sent_on)
            .unwrap_or_default()
            .to_owned(),
        context_type,
        created_at: timestamp.clone(),
        response_time: timestamp,
        course_id,
        has_rag_context: context_type == ContextType::Rag,
    }
}

/// Milliseconds since the Unix epoch. Not unique across fast successive turns.
fn placeholder_id(now: OffsetDateTime) -> i64 {
    i64::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0)
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
