//! auth::errors
//!
//! Authentication error types.
//!
//! Error messages never contain token values.
//!
//! ```
//! use confrev::auth::AuthError;
//!
//! let err = AuthError::NotAuthenticated("github.com".to_string());
//! assert!(err.to_string().contains("confrev auth"));
//! ```

use thiserror::Error;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token exists for the specified host.
    #[error("not authenticated for host '{0}'. Run 'confrev auth' or set CONFREV_TOKEN.")]
    NotAuthenticated(String),

    /// The supplied token is unusable (empty, or not valid in an HTTP header).
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Error from secret storage.
    #[error("secret store error: {0}")]
    SecretStore(String),
}

impl AuthError {
    /// Whether the user can fix this by running `confrev auth`.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthenticated(_) | AuthError::InvalidToken(_)
        )
    }
}

impl From<crate::secrets::SecretError> for AuthError {
    fn from(err: crate::secrets::SecretError) -> Self {
        AuthError::SecretStore(err.to_string())
    }
}
