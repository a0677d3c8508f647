//! auth
//!
//! Bearer-token provision for forge adapters.
//!
//! Tokens are personal access tokens kept in the secret store under
//! `<host>.token`, or supplied through `CONFREV_TOKEN`. They never appear
//! in logs, error messages or `Debug` output.
//!
//! # Example
//!
//! ```ignore
//! use confrev::auth::{provider_for_host, TokenProvider};
//!
//! let provider = provider_for_host("github.com", secrets::create_store("file")?);
//! let token = provider.bearer_token().await?;
//! ```

mod errors;
mod provider;

use std::sync::Arc;

pub use errors::AuthError;
pub use provider::{StaticTokenProvider, StoredTokenProvider};

use crate::secrets::SecretStore;

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "CONFREV_TOKEN";

/// Trait for providing bearer tokens to forge adapters.
///
/// Implementors must never log or expose token values.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token for the host.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] if no token exists
    /// - [`AuthError::SecretStore`] if the store cannot be read
    async fn bearer_token(&self) -> Result<String, AuthError>;

    /// Check if a token is available without contacting the forge.
    fn is_authenticated(&self) -> bool;

    /// Get the host this provider authenticates for.
    fn host(&self) -> &str;
}

/// Build the token provider for `host`.
///
/// A non-empty `CONFREV_TOKEN` wins over the secret store.
pub fn provider_for_host(host: &str, store: Box<dyn SecretStore>) -> Arc<dyn TokenProvider> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => {
            tracing::debug!(host, "using token from {}", TOKEN_ENV);
            Arc::new(StaticTokenProvider::new(token, host))
        }
        _ => Arc::new(StoredTokenProvider::new(host, store)),
    }
}

/// Host name for an API base URL, used to key stored tokens.
///
/// ```
/// use confrev::auth::host_for_api_base;
///
/// assert_eq!(host_for_api_base("https://api.github.com"), "github.com");
/// assert_eq!(host_for_api_base("https://ghe.example.com/api/v3"), "ghe.example.com");
/// ```
pub fn host_for_api_base(api_base: &str) -> String {
    let without_scheme = api_base
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(api_base);
    let host = without_scheme.split('/').next().unwrap_or(without_scheme);
    host.strip_prefix("api.").unwrap_or(host).to_string()
}
