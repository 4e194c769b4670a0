//! Bearer token held for the lifetime of the browser session.

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Shared handle to the current bearer token.
///
/// Clones share the same slot. Login writes through [`sign_in`](Self::sign_in),
/// the request layer reads through [`current`](Self::current).
#[derive(Clone, Default)]
pub struct CredentialStore {
    token: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token issued at login, replacing any previous one.
    ///
    /// An empty token clears the store.
    pub async fn sign_in(&self, token: impl Into<String>) {
        let token = token.into();
        *self.token.write().await = Some(token).filter(|t| !t.is_empty());
    }

    pub async fn sign_out(&self) {
        *self.token.write().await = None;
    }

    pub async fn current(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.token.try_read() {
            Ok(token) if token.is_some() => "<token>",
            Ok(_) => "<empty>",
            Err(_) => "<locked>",
        };
        f.debug_struct("CredentialStore").field("token", &state).finish()
    }
}
