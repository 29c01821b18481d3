use super::*;
use std::sync::Arc;

use crate::auth::{AuthContext, User};
use crate::service::ChatService;
use crate::types::{ChatHistoryPage, ChatMessage, ChatResponse};

// =============================================================
// parse_line
// =============================================================

#[test]
fn parse_plain_text_is_message() {
    assert_eq!(parse_line("  what is ownership? "), ReplCommand::Message("what is ownership?".into()));
}

#[test]
fn parse_blank_is_empty() {
    assert_eq!(parse_line("   "), ReplCommand::Empty);
}

#[test]
fn parse_slash_commands() {
    assert_eq!(parse_line("/history"), ReplCommand::History);
    assert_eq!(parse_line("/clear"), ReplCommand::Clear);
    assert_eq!(parse_line("/sources"), ReplCommand::Sources);
    assert_eq!(parse_line("/help"), ReplCommand::Help);
    assert_eq!(parse_line("/quit"), ReplCommand::Quit);
    assert_eq!(parse_line("/exit"), ReplCommand::Quit);
}

#[test]
fn parse_conversation_with_and_without_id() {
    assert_eq!(parse_line("/conversation abc-1"), ReplCommand::Conversation(Some("abc-1".into())));
    assert_eq!(parse_line("/conversation   "), ReplCommand::Conversation(None));
}

#[test]
fn parse_unknown_command() {
    assert_eq!(parse_line("/frobnicate now"), ReplCommand::Unknown("frobnicate".into()));
}

// =============================================================
// format
// =============================================================

#[test]
fn format_error_marks_retryable() {
    let msg = format_error(&ChatError::ApiResponse { status: 503, body: String::new() });
    assert!(msg.starts_with("error [E_API_RESPONSE]"));
    assert!(msg.ends_with("(retryable)"));

    let msg = format_error(&ChatError::Unauthenticated);
    assert_eq!(msg, "error [E_UNAUTHENTICATED]: user not authenticated");
}

// =============================================================
// run
// =============================================================

struct ScriptedChat;

#[async_trait::async_trait]
impl ChatService for ScriptedChat {
    async fn send_message(&self, message: &ChatMessage) -> Result<ChatResponse, ChatError> {
        if message.message == "fail" {
            return Err(ChatError::ApiRequest("connection refused".into()));
        }
        Ok(ChatResponse {
            response: format!("re: {}", message.message),
            conversation_id: Some("c1".into()),
            sources: Some(vec!["lecture-3.pdf".into()]),
        })
    }

    async fn get_chat_history(
        &self,
        _user_id: i64,
        _course_id: Option<i64>,
        _conversation_id: Option<&str>,
        _limit: usize,
    ) -> Result<ChatHistoryPage, ChatError> {
        Ok(ChatHistoryPage::default())
    }
}

fn scripted_store() -> ChatStore {
    let service = Arc::new(ScriptedChat);
    ChatStore::new(service, Arc::new(AuthContext::signed_in(User::new(1))))
}

async fn run_script(chat: &ChatStore, script: &str) -> String {
    let mut out = Vec::new();
    run(chat, None, script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn run_sends_messages_and_reports_sources() {
    let chat = scripted_store();
    let output = run_script(&chat, "hello\n/sources\n").await;

    assert!(output.contains("bot [rag]> re: hello"));
    assert!(output.contains("- lecture-3.pdf"));
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.current_conversation().as_deref(), Some("c1"));
}

#[tokio::test]
async fn run_reports_send_errors_and_continues() {
    let chat = scripted_store();
    let output = run_script(&chat, "fail\nok\n").await;

    assert!(output.contains("error [E_API_REQUEST]"));
    assert!(output.contains("re: ok"));
    assert_eq!(chat.messages().len(), 1);
}

#[tokio::test]
async fn run_clear_and_conversation_commands() {
    let chat = scripted_store();
    let output = run_script(&chat, "hello\n/clear\n/conversation c42\n").await;

    assert!(output.contains("(cleared)"));
    assert!(output.contains("(conversation c42)"));
    assert!(chat.messages().is_empty());
    assert!(chat.sources().is_empty());
    assert_eq!(chat.current_conversation().as_deref(), Some("c42"));
}

#[tokio::test]
async fn run_stops_at_quit() {
    let chat = scripted_store();
    let output = run_script(&chat, "/quit\nhello\n").await;

    assert!(output.is_empty());
    assert!(chat.messages().is_empty());
}

#[tokio::test]
async fn run_history_prints_transcript() {
    let chat = scripted_store();
    let output = run_script(&chat, "/history\n").await;
    assert!(output.contains("(no messages)"));
}
