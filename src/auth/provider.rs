//! auth::provider
//!
//! [`TokenProvider`] implementations.
//!
//! - [`StoredTokenProvider`] reads a personal access token from a
//!   [`SecretStore`] and caches it for the life of the process.
//! - [`StaticTokenProvider`] wraps a token supplied directly (the
//!   `CONFREV_TOKEN` environment variable, tests).

use std::sync::RwLock;

use tracing::debug;

use super::errors::AuthError;
use super::TokenProvider;
use crate::secrets::{token_key, SecretStore};

/// Token provider backed by a secret store.
pub struct StoredTokenProvider {
    host: String,
    store: Box<dyn SecretStore>,
    cache: RwLock<Option<String>>,
}

impl StoredTokenProvider {
    /// Create a provider for `host` reading from `store`.
    pub fn new(host: &str, store: Box<dyn SecretStore>) -> Self {
        Self {
            host: host.to_string(),
            store,
            cache: RwLock::new(None),
        }
    }

    /// Persist a new token for this host and replace the cached value.
    ///
    /// # Errors
    ///
    /// `InvalidToken` for blank tokens, `SecretStore` if the write fails.
    pub fn store_token(&self, token: &str) -> Result<(), AuthError> {
        let token = validate(token)?;
        self.store.set(&token_key(&self.host), token)?;
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(token.to_string());
        }
        debug!(host = %self.host, "stored access token");
        Ok(())
    }

    /// Remove the stored token for this host.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.delete(&token_key(&self.host))?;
        if let Ok(mut cache) = self.cache.write() {
            *cache = None;
        }
        debug!(host = %self.host, "removed access token");
        Ok(())
    }

    fn load(&self) -> Result<String, AuthError> {
        if let Some(token) = self.cache.read().ok().and_then(|c| c.clone()) {
            return Ok(token);
        }
        let token = self
            .store
            .get(&token_key(&self.host))?
            .ok_or_else(|| AuthError::NotAuthenticated(self.host.clone()))?;
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(token.clone());
        }
        Ok(token)
    }
}

impl std::fmt::Debug for StoredTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredTokenProvider")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl TokenProvider for StoredTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        self.load()
    }

    fn is_authenticated(&self) -> bool {
        self.load().is_ok()
    }

    fn host(&self) -> &str {
        &self.host
    }
}

/// Token provider for a token known up front.
pub struct StaticTokenProvider {
    host: String,
    token: String,
}

impl StaticTokenProvider {
    /// Wrap `token` for `host`.
    pub fn new(token: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            host: host.into(),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("host", &self.host)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        validate(&self.token).map(str::to_string)
    }

    fn is_authenticated(&self) -> bool {
        validate(&self.token).is_ok()
    }

    fn host(&self) -> &str {
        &self.host
    }
}

fn validate(token: &str) -> Result<&str, AuthError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::InvalidToken("token is empty".into()));
    }
    if token.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(AuthError::InvalidToken(
            "token contains whitespace or control characters".into(),
        ));
    }
    Ok(token)
}
