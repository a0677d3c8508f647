//! forge::factory
//!
//! Forge selection and creation.
//!
//! # Design
//!
//! Commands use `create_forge()` instead of importing specific forge
//! implementations, so the workflow layer only ever sees `dyn Forge`.
//!
//! # Provider Detection
//!
//! The factory can detect the forge and repository from a remote URL:
//! - GitHub URLs (`github.com`) → `GitHubForge`
//!
//! # Example
//!
//! ```ignore
//! use confrev::forge::{create_forge, detect_repo};
//!
//! let (provider, repo) = detect_repo("git@github.com:acme/config.git").unwrap();
//! let forge = create_forge(provider, token_provider, None)?;
//! ```

use std::sync::Arc;

use super::github::{repo_id_from_url, GitHubForge};
use super::traits::{Forge, ForgeError};
use crate::auth::TokenProvider;
use crate::core::types::RepoId;

/// Supported forge providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeProvider {
    /// GitHub and GitHub Enterprise
    GitHub,
}

impl ForgeProvider {
    /// Get all available providers.
    ///
    /// ```
    /// use confrev::forge::ForgeProvider;
    ///
    /// assert!(ForgeProvider::all().contains(&ForgeProvider::GitHub));
    /// ```
    pub fn all() -> &'static [ForgeProvider] {
        &[ForgeProvider::GitHub]
    }

    /// Get the provider name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            ForgeProvider::GitHub => "github",
        }
    }

    /// Parse a provider from a string (case-insensitive).
    ///
    /// ```
    /// use confrev::forge::ForgeProvider;
    ///
    /// assert_eq!(ForgeProvider::parse("GitHub"), Some(ForgeProvider::GitHub));
    /// assert_eq!(ForgeProvider::parse("unknown"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "github" => Some(ForgeProvider::GitHub),
            _ => None,
        }
    }
}

impl std::fmt::Display for ForgeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the forge provider and repository identity from a remote URL.
///
/// ```
/// use confrev::forge::{detect_repo, ForgeProvider};
///
/// let (provider, repo) = detect_repo("git@github.com:acme/config.git").unwrap();
/// assert_eq!(provider, ForgeProvider::GitHub);
/// assert_eq!(repo.to_string(), "acme/config");
/// assert!(detect_repo("https://example.com/acme/config").is_none());
/// ```
pub fn detect_repo(remote_url: &str) -> Option<(ForgeProvider, RepoId)> {
    repo_id_from_url(remote_url).map(|repo| (ForgeProvider::GitHub, repo))
}

/// Create a forge for a provider.
///
/// `api_base` overrides the provider's public API endpoint (GitHub
/// Enterprise, local test servers).
pub fn create_forge(
    provider: ForgeProvider,
    token_provider: Arc<dyn TokenProvider>,
    api_base: Option<&str>,
) -> Result<Arc<dyn Forge>, ForgeError> {
    match provider {
        ForgeProvider::GitHub => {
            let mut forge = GitHubForge::new_with_provider(token_provider);
            if let Some(base) = api_base {
                if !(base.starts_with("https://") || base.starts_with("http://")) {
                    return Err(ForgeError::NetworkError(format!(
                        "api_base must be an http(s) URL, got '{}'",
                        base
                    )));
                }
                forge = forge.with_api_base(base);
            }
            Ok(Arc::new(forge))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;

    fn provider() -> Arc<dyn TokenProvider> {
        Arc::new(StaticTokenProvider::new("token", "github.com"))
    }

    #[test]
    fn provider_name_roundtrip() {
        for p in ForgeProvider::all() {
            assert_eq!(ForgeProvider::parse(p.name()), Some(*p));
        }
    }

    #[test]
    fn detect_github_https() {
        let (p, repo) = detect_repo("https://github.com/acme/config").unwrap();
        assert_eq!(p, ForgeProvider::GitHub);
        assert_eq!(repo.name(), "config");
    }

    #[test]
    fn detect_unknown() {
        assert!(detect_repo("git@gitlab.com:acme/config.git").is_none());
    }

    #[test]
    fn create_github_forge() {
        let forge = create_forge(ForgeProvider::GitHub, provider(), None).unwrap();
        assert_eq!(forge.name(), "github");
    }

    #[test]
    fn create_rejects_non_http_api_base() {
        let result = create_forge(ForgeProvider::GitHub, provider(), Some("ftp://example"));
        assert!(result.is_err());
    }
}
