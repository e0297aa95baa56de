//! Shared application state.

use crate::auth::TokenIssuer;
use crate::todos::TodoStore;
use apiproxy_core::ProxyConfig;
use std::sync::Arc;

/// State handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Todo storage
    pub todos: Arc<TodoStore>,
    /// Token signer and verifier
    pub tokens: Arc<TokenIssuer>,
    /// Whether protected routes require a token
    pub use_auth: bool,
}

impl AppState {
    /// Builds state from configuration with a seeded todo store.
    #[must_use]
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            todos: Arc::new(TodoStore::seeded()),
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret)),
            use_auth: config.use_auth,
        }
    }

    /// Replaces the todo store.
    #[must_use]
    pub fn with_todos(mut self, todos: TodoStore) -> Self {
        self.todos = Arc::new(todos);
        self
    }
}
