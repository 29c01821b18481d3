//! Line-oriented chat view used by the `coursechat repl` command.
//!
//! Plain lines are sent as messages; lines starting with `/` drive the
//! store directly. Send failures are reported inline and the loop keeps
//! going; history failures surface only as an unchanged transcript.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::store::ChatStore;
use crate::types::{ChatError, ChatHistory, ContextType, ErrorCode};

pub const HELP: &str = "\
commands:
  /history            reload this conversation's history
  /clear              forget messages, sources and conversation
  /conversation [ID]  switch conversation (no ID starts a new one)
  /sources            show sources from the last grounded answer
  /help               show this help
  /quit               leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Message(String),
    History,
    Clear,
    Conversation(Option<String>),
    Sources,
    Help,
    Quit,
    Unknown(String),
}

#[must_use]
pub fn parse_line(line: &str) -> ReplCommand {
    let line = line.trim();
    if line.is_empty() {
        return ReplCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ReplCommand::Message(line.to_owned());
    };
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
    match name {
        "history" => ReplCommand::History,
        "clear" => ReplCommand::Clear,
        "conversation" | "conv" => ReplCommand::Conversation(arg.map(str::to_owned)),
        "sources" => ReplCommand::Sources,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_owned()),
    }
}

/// Render one turn for the terminal.
#[must_use]
pub fn format_turn(turn: &ChatHistory) -> String {
    format!("you> {}\nbot{}> {}", turn.user_message, tag(turn.context_type), turn.ai_response)
}

#[must_use]
pub fn format_error(error: &ChatError) -> String {
    let hint = if error.retryable() { " (retryable)" } else { "" };
    format!("error [{}]: {error}{hint}", error.error_code())
}

/// Write the full transcript, oldest first.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn print_transcript(chat: &ChatStore, out: &mut impl Write) -> std::io::Result<()> {
    let messages = chat.messages();
    if messages.is_empty() {
        writeln!(out, "(no messages)")?;
    }
    for turn in &messages {
        writeln!(out, "{}", format_turn(turn))?;
    }
    Ok(())
}

/// Drive `chat` from `input` until end of input or `/quit`.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub async fn run<R, W>(chat: &ChatStore, course_id: Option<i64>, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ReplCommand::Empty => {}
            ReplCommand::Message(text) => match chat.send_message(&text, course_id).await {
                Ok(turn) => writeln!(out, "bot{}> {}", tag(turn.context_type), turn.ai_response)?,
                Err(e) => writeln!(out, "{}", format_error(&e))?,
            },
            ReplCommand::History => {
                let conversation = chat.current_conversation();
                chat.load_chat_history(course_id, conversation.as_deref()).await;
                print_transcript(chat, out)?;
            }
            ReplCommand::Clear => {
                chat.clear_chat();
                writeln!(out, "(cleared)")?;
            }
            ReplCommand::Conversation(id) => {
                match &id {
                    Some(id) => writeln!(out, "(conversation {id})")?,
                    None => writeln!(out, "(new conversation)")?,
                }
                chat.set_current_conversation(id);
            }
            ReplCommand::Sources => {
                let sources = chat.sources();
                if sources.is_empty() {
                    writeln!(out, "(no sources)")?;
                }
                for source in sources {
                    writeln!(out, "- {source}")?;
                }
            }
            ReplCommand::Help => writeln!(out, "{HELP}")?,
            ReplCommand::Quit => break,
            ReplCommand::Unknown(name) => writeln!(out, "unknown command /{name}; try /help")?,
        }
        out.flush()?;
    }
    Ok(())
}

fn tag(context_type: ContextType) -> &'static str {
    match context_type {
        ContextType::Rag => " [rag]",
        ContextType::General => "",
    }
}

#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;
