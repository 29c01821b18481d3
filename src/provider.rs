//! Scoped access to a [`ChatStore`].
//!
//! DESIGN
//! ======
//! A `ChatProvider` owns one store for the lifetime of a view. Code that
//! runs inside [`ChatProvider::provide`] (or `provide_sync`) can fetch the
//! store with [`use_chat`] instead of threading it through every call.
//! Outside a provider `use_chat` panics immediately: a missing provider is
//! a wiring bug, not a runtime condition. Explicit passing of
//! `Arc<ChatStore>` remains the primary API.
//!
//! The registration is task-local, so tasks spawned from inside a scope do
//! not inherit it; hand them the `Arc<ChatStore>` directly.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::auth::IdentityProvider;
use crate::service::ChatService;
use crate::store::ChatStore;

tokio::task_local! {
    static CURRENT_CHAT: Arc<ChatStore>;
}

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    #[error("use_chat must be called within a ChatProvider")]
    MissingProvider,
}

pub struct ChatProvider {
    store: Arc<ChatStore>,
}

impl ChatProvider {
    /// Create a provider with a fresh, empty store.
    #[must_use]
    pub fn mount(service: Arc<dyn ChatService>, identity: Arc<dyn IdentityProvider>) -> Self {
        debug!("chat provider mounted");
        Self { store: Arc::new(ChatStore::new(service, identity)) }
    }

    /// Wrap an already-configured store.
    #[must_use]
    pub fn with_store(store: Arc<ChatStore>) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn store(&self) -> Arc<ChatStore> {
        Arc::clone(&self.store)
    }

    /// Run `fut` with this provider's store registered. Consumes the
    /// provider; the store is released once `fut` completes and no other
    /// handle to it remains.
    pub async fn provide<F>(self, fut: F) -> F::Output
    where
        F: Future,
    {
        let output = CURRENT_CHAT.scope(self.store, fut).await;
        debug!("chat provider unmounted");
        output
    }

    /// Synchronous counterpart of [`Self::provide`].
    pub fn provide_sync<R>(self, f: impl FnOnce() -> R) -> R {
        let output = CURRENT_CHAT.sync_scope(self.store, f);
        debug!("chat provider unmounted");
        output
    }
}

/// Fetch the store registered by the enclosing [`ChatProvider`].
///
/// # Errors
///
/// Returns [`ScopeError::MissingProvider`] outside a provider scope.
pub fn try_use_chat() -> Result<Arc<ChatStore>, ScopeError> {
    CURRENT_CHAT
        .try_with(Arc::clone)
        .map_err(|_| ScopeError::MissingProvider)
}

/// Fetch the store registered by the enclosing [`ChatProvider`].
///
/// # Panics
///
/// Panics when called outside a provider scope.
#[must_use]
pub fn use_chat() -> Arc<ChatStore> {
    match try_use_chat() {
        Ok(store) => store,
        Err(e) => panic!("{e}"),
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
