//! Authentication state and the identity seam consumed by the chat store.

use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self { id, name: None }
    }
}

/// Authentication state tracking the current user.
#[derive(Clone, Debug, Default)]
pub struct AuthState {
    pub user: Option<User>,
}

/// Source of the current identity. `None` means "not authenticated".
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<User>;
}

/// Shared, mutable auth state. The chat store reads it through
/// [`IdentityProvider`] on every operation, so sign-in and sign-out take
/// effect immediately for subsequent calls.
#[derive(Debug, Default)]
pub struct AuthContext {
    state: RwLock<AuthState>,
}

impl AuthContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user: User) -> Self {
        Self { state: RwLock::new(AuthState { user: Some(user) }) }
    }

    pub fn sign_in(&self, user: User) {
        info!(user_id = user.id, name = user.name.as_deref().unwrap_or(""), "signed in");
        self.state.write().unwrap_or_else(PoisonError::into_inner).user = Some(user);
    }

    pub fn sign_out(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(user) = state.user.take() {
            info!(user_id = user.id, "signed out");
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.state.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.read().unwrap_or_else(PoisonError::into_inner).user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).user.is_some()
    }
}

impl IdentityProvider for AuthContext {
    fn current_user(&self) -> Option<User> {
        self.user()
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
