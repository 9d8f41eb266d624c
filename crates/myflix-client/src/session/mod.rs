mod store;

use std::path::Path;
use std::sync::Arc;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::error::StorageResult;
use crate::models::Session;

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";

const BEARER_PREFIX: &str = "Bearer ";

/// The one place that knows whether a visitor is logged in.
///
/// Cloning is cheap and every clone sees the same storage, so the same store
/// can be handed to the API client and to the views.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: impl KeyValueStore + 'static) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Ok(Self::new(FileStore::open(path)?))
    }

    pub fn login(&self, username: &str, token: &str) -> StorageResult<Session> {
        let token = bearer(token);
        self.storage
            .set_many(&[(USER_KEY, username), (TOKEN_KEY, token.as_str())])?;
        tracing::info!("Session started for {username}");

        Ok(Session {
            username: username.to_string(),
            token,
        })
    }

    pub fn logout(&self) -> StorageResult<()> {
        self.storage.remove_many(&[USER_KEY, TOKEN_KEY])?;
        tracing::info!("Session cleared");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn current_username(&self) -> Option<String> {
        self.storage.get(USER_KEY).filter(|u| !u.is_empty())
    }

    /// The stored token with exactly one `Bearer ` prefix.
    pub fn current_token(&self) -> Option<String> {
        let stored = self.storage.get(TOKEN_KEY)?;
        if strip_bearer(&stored).is_empty() {
            return None;
        }
        Some(bearer(&stored))
    }

    pub fn session(&self) -> Option<Session> {
        Some(Session {
            username: self.current_username()?,
            token: self.current_token()?,
        })
    }
}

/// Prefixes `token` with a single `Bearer `, dropping any it already carries.
pub fn bearer(token: &str) -> String {
    format!("{BEARER_PREFIX}{}", strip_bearer(token))
}

fn strip_bearer(mut token: &str) -> &str {
    while let Some(rest) = token.strip_prefix(BEARER_PREFIX) {
        token = rest;
    }
    token
}
