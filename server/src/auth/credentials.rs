//! Credential storage.
//!
//! Replaces token reads from ambient storage: whoever needs the bearer token
//! is handed a [`CredentialStore`].

use std::fmt;
use std::sync::RwLock;

/// Holds the bearer token of one session.
pub trait CredentialStore: Send + Sync {
    /// The current token, if any.
    fn get(&self) -> Option<String>;

    /// Replace the token.
    fn set(&self, token: String);

    /// Forget the token (logout).
    fn clear(&self);
}

/// In-memory credential store.
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("has_token", &self.get().is_some())
            .finish()
    }
}

impl MemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, token: String) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token);
    }

    fn clear(&self) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
