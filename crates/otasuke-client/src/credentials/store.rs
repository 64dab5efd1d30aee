//! Credential persistence abstraction.
//!
//! The pipeline only ever talks to a [`CredentialStore`] through the
//! [`TokenStore`] adapter, which knows the two keys the Backend API needs.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Key under which a credential is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKey {
    AccessToken,
    RefreshToken,
}

impl TokenKey {
    pub const ALL: [TokenKey; 2] = [TokenKey::AccessToken, TokenKey::RefreshToken];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persistent key-value storage for credentials.
///
/// Implementations must be cheap to call: the pipeline reads the access token
/// before every request and writes the rotated pair while holding the refresh
/// coordinator lock.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError>;

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: TokenKey) -> Result<(), StoreError>;
}

/// In-memory credential store. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<TokenKey, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a token pair.
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        {
            let mut values = store.values.write();
            values.insert(TokenKey::AccessToken, access_token.to_string());
            values.insert(TokenKey::RefreshToken, refresh_token.to_string());
        }
        store
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: TokenKey) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(&key).cloned())
    }

    fn set(&self, key: TokenKey, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: TokenKey) -> Result<(), StoreError> {
        self.values.write().remove(&key);
        Ok(())
    }
}

/// An access/refresh credential pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

// Tokens are bearer secrets; keep them out of debug output and logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Typed view over a [`CredentialStore`].
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<dyn CredentialStore>,
}

impl TokenStore {
    pub fn new(inner: Arc<dyn CredentialStore>) -> Self {
        Self { inner }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    pub fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.inner.get(TokenKey::AccessToken)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StoreError> {
        self.inner.get(TokenKey::RefreshToken)
    }

    /// Store both halves of a pair. Refreshes rotate both tokens.
    pub fn set_tokens(&self, pair: &TokenPair) -> Result<(), StoreError> {
        self.inner.set(TokenKey::AccessToken, &pair.access_token)?;
        self.inner.set(TokenKey::RefreshToken, &pair.refresh_token)
    }

    /// Remove every stored credential.
    ///
    /// Both keys are attempted even if the first removal fails.
    pub fn clear(&self) -> Result<(), StoreError> {
        let access = self.inner.remove(TokenKey::AccessToken);
        let refresh = self.inner.remove(TokenKey::RefreshToken);
        access.and(refresh)
    }

    pub fn has_access_token(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_store_set_and_clear() {
        let tokens = TokenStore::in_memory();
        assert_eq!(tokens.access_token().unwrap(), None);
        assert!(!tokens.has_access_token());

        tokens.set_tokens(&TokenPair::new("a1", "r1")).unwrap();
        assert_eq!(tokens.access_token().unwrap().as_deref(), Some("a1"));
        assert_eq!(tokens.refresh_token().unwrap().as_deref(), Some("r1"));

        tokens.clear().unwrap();
        assert_eq!(tokens.access_token().unwrap(), None);
        assert_eq!(tokens.refresh_token().unwrap(), None);
    }

    #[test]
    fn test_set_tokens_overwrites_both() {
        let store = Arc::new(MemoryCredentialStore::with_tokens("old-a", "old-r"));
        let tokens = TokenStore::new(store.clone());

        tokens.set_tokens(&TokenPair::new("new-a", "new-r")).unwrap();

        assert_eq!(
            store.get(TokenKey::AccessToken).unwrap().as_deref(),
            Some("new-a")
        );
        assert_eq!(
            store.get(TokenKey::RefreshToken).unwrap().as_deref(),
            Some("new-r")
        );
    }

    #[test]
    fn test_token_pair_debug_is_redacted() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let debug = format!("{pair:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_token_key_names() {
        assert_eq!(TokenKey::AccessToken.to_string(), "access_token");
        assert_eq!(TokenKey::RefreshToken.as_str(), "refresh_token");
    }
}
