//! revision::errors
//!
//! Error type for revision workflows.
//!
//! Backend failures are mapped into the workflow vocabulary: a rejected
//! content token becomes [`RevisionError::Conflict`], a missing resource
//! [`RevisionError::NotFound`], a transport failure
//! [`RevisionError::Network`]. Anything else is carried as
//! [`RevisionError::Backend`].

use thiserror::Error;

use super::session::{SessionId, SessionState};
use crate::core::types::{BranchName, RepoPath};
use crate::forge::ForgeError;

/// Errors from the revision workflow layer.
#[derive(Debug, Clone, Error)]
pub enum RevisionError {
    /// A reference, file, commit or branch does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The file changed remotely since it was last read.
    #[error("conflict: {0}. Re-open the file and reapply your edit.")]
    Conflict(String),

    /// The branch may not be deleted.
    #[error("branch '{0}' is protected and cannot be deleted")]
    ProtectedBranch(BranchName),

    /// A branch with this name already exists.
    #[error("branch '{0}' already exists")]
    DuplicateBranch(BranchName),

    /// The branch name is empty or not a valid git branch name.
    #[error("invalid branch name: {0}")]
    InvalidName(String),

    /// Caller input rejected before any network call.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transport failure, surfaced verbatim.
    #[error("network error: {0}")]
    Network(String),

    /// A diff endpoint did not resolve to a known commit.
    #[error("revision not found: {0}")]
    RevisionNotFound(String),

    /// No token is tracked for the (branch, path) a mutation targets.
    #[error("no current content token for {path} on {branch}. Open the file first.")]
    StaleOrMissingToken { branch: BranchName, path: RepoPath },

    /// The session already has a remote call outstanding.
    #[error("session {0} is busy")]
    Busy(SessionId),

    /// The session was closed while a remote call was outstanding.
    #[error("session {0} was closed; response discarded")]
    SessionClosed(SessionId),

    /// The step is not allowed in the session's current state.
    #[error("cannot {action} while {from}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },

    /// No session with this id exists.
    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    /// Any other backend failure (auth, rate limiting, API errors).
    #[error(transparent)]
    Backend(ForgeError),
}

impl RevisionError {
    /// Whether this is an optimistic-concurrency rejection.
    pub fn is_conflict(&self) -> bool {
        matches!(self, RevisionError::Conflict(_))
    }
}

impl From<ForgeError> for RevisionError {
    fn from(err: ForgeError) -> Self {
        match err {
            ForgeError::NotFound(msg) => RevisionError::NotFound(msg),
            ForgeError::Conflict(msg) => RevisionError::Conflict(msg),
            ForgeError::NetworkError(msg) => RevisionError::Network(msg),
            other => RevisionError::Backend(other),
        }
    }
}
