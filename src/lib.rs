//! # coursechat
//!
//! Client-side chat session for a course assistant backend.
//!
//! DESIGN
//! ======
//! [`store::ChatStore`] holds the session (messages, current conversation,
//! loading flag, latest sources) and talks to the backend through the
//! [`service::ChatService`] trait. Identity comes from an injected
//! [`auth::IdentityProvider`]. [`provider::ChatProvider`] scopes a store to
//! a view so nested code can fetch it with [`provider::use_chat`].

pub mod auth;
pub mod config;
pub mod provider;
pub mod repl;
pub mod service;
pub mod store;
pub mod types;

pub use auth::{AuthContext, IdentityProvider, User};
pub use provider::{ChatProvider, use_chat};
pub use service::{ChatService, HttpChatService};
pub use store::{ChatState, ChatStore};
pub use types::{ChatError, ChatHistory, ChatMessage, ChatResponse, ContextType};
