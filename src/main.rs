use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use coursechat::config::ChatClientConfig;
use coursechat::repl;
use coursechat::types::ErrorCode;
use coursechat::{AuthContext, ChatError, ChatProvider, ChatStore, HttpChatService, User, use_chat};

#[derive(thiserror::Error)]
enum CliError {
    #[error("not signed in: pass --user-id or set CHAT_USER_ID")]
    NotSignedIn,
    #[error("chat request failed [{code}]: {0}", code = .0.error_code())]
    Chat(#[from] ChatError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

// `main` reports its error through `Debug`; show the user-facing message instead.
impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Parser, Debug)]
#[command(name = "coursechat", about = "Course assistant chat client")]
struct Cli {
    #[arg(long, env = "CHAT_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "CHAT_USER_ID")]
    user_id: Option<i64>,

    #[arg(long, env = "CHAT_USER_NAME")]
    user_name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct Target {
    #[arg(long)]
    course_id: Option<i64>,

    #[arg(long)]
    conversation_id: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one message and print the answer.
    Send {
        message: String,
        #[command(flatten)]
        target: Target,
    },
    /// Print stored history, oldest first.
    History {
        #[command(flatten)]
        target: Target,
    },
    /// Interactive chat; type /help for commands.
    Repl {
        #[command(flatten)]
        target: Target,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut config = ChatClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    tracing::info!(base_url = %config.base_url, history_limit = config.history_limit, "chat client configured");

    let auth = Arc::new(AuthContext::new());
    if let Some(id) = cli.user_id {
        auth.sign_in(User { id, name: cli.user_name.clone() });
    }
    if !auth.is_authenticated() {
        return Err(CliError::NotSignedIn);
    }

    let service = Arc::new(HttpChatService::new(&config)?);
    let store = ChatStore::new(service, auth).with_history_limit(config.history_limit);
    ChatProvider::with_store(Arc::new(store))
        .provide(run(cli.command))
        .await
}

async fn run(command: Command) -> Result<(), CliError> {
    let chat = use_chat();
    let mut out = io::stdout().lock();
    match command {
        Command::Send { message, target } => {
            chat.set_current_conversation(target.conversation_id);
            let turn = chat.send_message(&message, target.course_id).await?;
            writeln!(out, "{}", turn.ai_response)?;
            if let Some(conversation) = chat.current_conversation() {
                writeln!(out, "conversation: {conversation}")?;
            }
            for source in chat.sources() {
                writeln!(out, "source: {source}")?;
            }
        }
        Command::History { target } => {
            chat.load_chat_history(target.course_id, target.conversation_id.as_deref()).await;
            repl::print_transcript(&chat, &mut out)?;
        }
        Command::Repl { target } => {
            chat.set_current_conversation(target.conversation_id);
            writeln!(out, "{}", repl::HELP)?;
            out.flush()?;
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run(&chat, target.course_id, input, &mut out).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
