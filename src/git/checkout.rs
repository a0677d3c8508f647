//! git::checkout
//!
//! Opening a local checkout and reading its remotes.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::types::RepoId;
use crate::forge::detect_repo;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// A non-bare local checkout.
pub struct Checkout {
    repo: git2::Repository,
    root: PathBuf,
}

impl std::fmt::Debug for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkout").field("root", &self.root).finish()
    }
}

impl Checkout {
    /// Discover the checkout containing `path`.
    ///
    /// # Errors
    ///
    /// `NotARepo` if no repository encloses `path`, `BareRepo` if the
    /// repository has no working directory.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        let root = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();
        debug!(root = %root.display(), "opened checkout");
        Ok(Self { repo, root })
    }

    /// Working directory root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.git` directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the default remote name.
    ///
    /// Prefers "origin", otherwise the first remote, or `None` if there are none.
    pub fn default_remote(&self) -> Result<Option<String>, GitError> {
        let remotes = self.repo.remotes()?;
        let names: Vec<&str> = remotes.iter().flatten().collect();
        if names.contains(&"origin") {
            return Ok(Some("origin".to_string()));
        }
        Ok(names.first().map(|s| s.to_string()))
    }

    /// Hosted repository that `remote` points at.
    ///
    /// Falls back to the default remote when `remote` does not exist.
    /// `None` if no remote URL is a recognizable hosting URL.
    pub fn hosted_repo(&self, remote: &str) -> Result<Option<RepoId>, GitError> {
        let url = match self.remote_url(remote)? {
            Some(url) => Some(url),
            None => match self.default_remote()? {
                Some(fallback) => self.remote_url(&fallback)?,
                None => None,
            },
        };
        Ok(url
            .as_deref()
            .and_then(detect_repo)
            .map(|(_, repo)| repo))
    }
}
