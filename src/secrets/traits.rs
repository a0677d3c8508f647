//! secrets::traits
//!
//! Key-value interface for secrets. Keys are namespaced by host
//! (e.g. `github.com.token`) so several forges can share one store.
//!
//! Implementations must never log, print, or include secret values in
//! error messages.

use thiserror::Error;

/// Errors from secret storage operations.
///
/// Messages never include secret values.
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to read from secret storage.
    #[error("failed to read secret: {0}")]
    ReadError(String),

    /// Failed to write to secret storage.
    #[error("failed to write secret: {0}")]
    WriteError(String),

    /// Provider not available or not configured.
    #[error("secret provider not available: {0}")]
    ProviderNotAvailable(String),
}

/// Trait for secret storage providers.
pub trait SecretStore: Send + Sync {
    /// Get a secret by key, `Ok(None)` if it does not exist.
    fn get(&self, key: &str) -> Result<Option<String>, SecretError>;

    /// Set a secret, overwriting any existing value.
    fn set(&self, key: &str, value: &str) -> Result<(), SecretError>;

    /// Delete a secret. Deleting a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), SecretError>;

    /// Check if a secret exists.
    fn exists(&self, key: &str) -> Result<bool, SecretError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Key under which the access token for `host` is stored.
///
/// ```
/// use confrev::secrets::token_key;
///
/// assert_eq!(token_key("github.com"), "github.com.token");
/// ```
pub fn token_key(host: &str) -> String {
    format!("{}.token", host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore(Mutex<HashMap<String, String>>);

    impl SecretStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), SecretError> {
            self.0.lock().unwrap().insert(key.into(), value.into());
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<(), SecretError> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[test]
    fn exists_uses_get() {
        let store = MemoryStore::default();
        assert!(!store.exists("k").unwrap());
        store.set("k", "v").unwrap();
        assert!(store.exists("k").unwrap());
    }

    #[test]
    fn error_display_has_no_values() {
        let err = SecretError::WriteError("disk full".into());
        assert_eq!(err.to_string(), "failed to write secret: disk full");
    }
}
