//! secrets
//!
//! Secret storage abstraction for forge access tokens.
//!
//! Secrets go through the `SecretStore` trait. The only provider is
//! [`FileSecretStore`] (`~/.confrev/secrets.toml`).
//!
//! - Secrets are **never** logged or included in error messages
//! - The file store uses 0600 permissions on Unix
//! - All writes are atomic (temp file + rename)

mod file_store;
mod traits;

pub use file_store::FileSecretStore;
pub use traits::{token_key, SecretError, SecretStore};

/// The default secret store provider name.
pub const DEFAULT_PROVIDER: &str = "file";

/// Create a secret store based on the provider name from configuration.
///
/// # Errors
///
/// - Unknown provider name
/// - Initialization errors from the store
pub fn create_store(provider: &str) -> Result<Box<dyn SecretStore>, SecretError> {
    match provider {
        "file" => Ok(Box::new(FileSecretStore::new()?)),
        other => Err(SecretError::ProviderNotAvailable(format!(
            "unknown secret provider: '{}' (valid: file)",
            other
        ))),
    }
}
