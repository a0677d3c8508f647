//! forge::traits
//!
//! Forge trait definition for talking to the remote hosting service.
//!
//! # Design
//!
//! The `Forge` trait is async because every operation is a network
//! request/response pair. All methods return `Result` so backend failures
//! surface to the caller instead of being retried or swallowed here.
//!
//! The hosting backend owns the commit graph, diff computation and
//! rollback execution. This layer only carries requests and maps
//! responses into domain types.
//!
//! # Example
//!
//! ```ignore
//! use confrev::forge::{Forge, PutFileRequest};
//!
//! async fn save(forge: &dyn Forge, repo: &RepoId) -> Result<(), ForgeError> {
//!     let path = RepoPath::new("gateway/routes.yaml")?;
//!     let current = forge.get_file_content(repo, "main", &path).await?;
//!     let new_token = forge
//!         .put_file(repo, PutFileRequest {
//!             branch: BranchName::main(),
//!             path,
//!             token: current.token,
//!             message: "Raise rate limit".to_string(),
//!             content: "limit: 200\n".to_string(),
//!         })
//!         .await?;
//!     println!("saved, new token {}", new_token.short());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{BranchName, CommitId, ContentToken, RepoId, RepoPath};

/// Errors from forge operations.
///
/// These map to the common failure modes of a remote hosting API.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The supplied content token no longer matches the branch tip.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The operation is not supported by this forge.
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Dir,
    Other,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::File => write!(f, "file"),
            FileKind::Dir => write!(f, "dir"),
            FileKind::Other => write!(f, "other"),
        }
    }
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Final path component
    pub name: String,
    /// File, directory or anything else (symlink, submodule)
    pub kind: FileKind,
    /// Repository-relative path
    pub path: RepoPath,
    /// Last modification time, when the backend reports one
    pub last_modified: Option<DateTime<Utc>>,
}

/// Content of a file at a (ref, path) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRevision {
    /// Repository-relative path
    pub path: RepoPath,
    /// Branch name or commit id the content was read at
    pub reference: String,
    /// Decoded UTF-8 content
    pub content: String,
    /// Content identifier to echo back on the next mutation
    pub token: ContentToken,
}

/// A commit in a per-path history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full identifier
    pub id: CommitId,
    /// Author display name
    pub author: String,
    /// Commit message
    pub message: String,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
    /// Path the history was requested for
    pub path: RepoPath,
}

impl CommitRecord {
    /// Abbreviated identifier shown to users.
    pub fn short(&self) -> &str {
        self.id.short()
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// A file touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path of the file
    pub path: String,
    /// Change status as reported by the backend (added, modified, removed, ...)
    pub status: String,
    /// Lines added
    pub additions: u32,
    /// Lines removed
    pub deletions: u32,
}

/// Full details for a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetail {
    /// Full identifier
    pub id: CommitId,
    /// Author display name
    pub author: String,
    /// Commit message
    pub message: String,
    /// Author timestamp
    pub timestamp: DateTime<Utc>,
    /// Parent commit ids
    pub parents: Vec<CommitId>,
    /// Files changed by the commit
    pub files: Vec<ChangedFile>,
}

/// A branch on the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Branch name
    pub name: BranchName,
    /// Commit at the branch tip, when known
    pub tip: Option<CommitId>,
    /// Whether the backend reports the branch as protected
    pub protected: bool,
}

/// Request to write a file on a branch.
#[derive(Debug, Clone)]
pub struct PutFileRequest {
    /// Branch to commit to
    pub branch: BranchName,
    /// File to write
    pub path: RepoPath,
    /// Token observed for (branch, path); the backend rejects stale values
    pub token: ContentToken,
    /// Commit message
    pub message: String,
    /// New file content
    pub content: String,
}

/// Request to delete a file on a branch.
#[derive(Debug, Clone)]
pub struct DeleteFileRequest {
    /// Branch to commit to
    pub branch: BranchName,
    /// File to delete
    pub path: RepoPath,
    /// Token observed for (branch, path)
    pub token: ContentToken,
    /// Commit message
    pub message: String,
}

/// Request to restore a file to its content at an earlier commit.
///
/// Rollback is forward-only: it appends a new commit at the branch tip.
#[derive(Debug, Clone)]
pub struct RollbackRequest {
    /// Branch to commit to
    pub branch: BranchName,
    /// File to restore
    pub path: RepoPath,
    /// Commit whose content is restored
    pub target: CommitId,
    /// Commit message for the new commit
    pub message: String,
}

/// Result of a successful rollback.
#[derive(Debug, Clone)]
pub struct RollbackOutcome {
    /// Content token of the file at the new branch tip
    pub new_token: ContentToken,
    /// The commit created by the rollback
    pub new_commit: CommitRecord,
}

/// The Forge trait for talking to the remote hosting service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`. Callers should handle:
/// - `AuthRequired` / `AuthFailed`: Prompt user to authenticate
/// - `NotFound`: Resource doesn't exist
/// - `Conflict`: Re-open the file and redo the edit
/// - `RateLimited`: Back off and retry (caller's decision)
/// - `NetworkError`: Check connectivity
///
/// Implementations never retry a mutation on their own.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github", "mock").
    fn name(&self) -> &'static str;

    /// List the entries of a directory at a branch.
    ///
    /// Pass [`RepoPath::root`] for the repository root.
    async fn list_files(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        dir: &RepoPath,
    ) -> Result<Vec<FileEntry>, ForgeError>;

    /// Read a file at a branch name or commit id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file does not exist at that ref
    async fn get_file_content(
        &self,
        repo: &RepoId,
        reference: &str,
        path: &RepoPath,
    ) -> Result<FileRevision, ForgeError>;

    /// Write a file, returning the new content token.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `request.token` does not match the current branch tip
    async fn put_file(
        &self,
        repo: &RepoId,
        request: PutFileRequest,
    ) -> Result<ContentToken, ForgeError>;

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// - `Conflict` if `request.token` does not match the current branch tip
    /// - `NotFound` if the file does not exist
    async fn delete_file(&self, repo: &RepoId, request: DeleteFileRequest)
        -> Result<(), ForgeError>;

    /// List the commits touching `path` on `branch`, newest first.
    async fn list_commits(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        path: &RepoPath,
    ) -> Result<Vec<CommitRecord>, ForgeError>;

    /// Get a single commit by full identifier.
    async fn get_commit(&self, repo: &RepoId, id: &CommitId) -> Result<CommitDetail, ForgeError>;

    /// Get the unified diff of `path` between two commits.
    ///
    /// Returns an empty string when the file is unchanged.
    async fn get_diff(
        &self,
        repo: &RepoId,
        path: &RepoPath,
        old: &CommitId,
        new: &CommitId,
    ) -> Result<String, ForgeError>;

    /// Restore a file to its content at `request.target` with a new commit.
    async fn rollback(
        &self,
        repo: &RepoId,
        request: RollbackRequest,
    ) -> Result<RollbackOutcome, ForgeError>;

    /// List all branches.
    async fn list_branches(&self, repo: &RepoId) -> Result<Vec<Branch>, ForgeError>;

    /// Create `name` pointing at the tip of `from`.
    async fn create_branch(
        &self,
        repo: &RepoId,
        name: &BranchName,
        from: &BranchName,
    ) -> Result<Branch, ForgeError>;

    /// Delete a branch.
    async fn delete_branch(&self, repo: &RepoId, name: &BranchName) -> Result<(), ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_kind_display() {
        assert_eq!(format!("{}", FileKind::File), "file");
        assert_eq!(format!("{}", FileKind::Dir), "dir");
        assert_eq!(format!("{}", FileKind::Other), "other");
    }

    #[test]
    fn commit_summary_is_first_line() {
        let record = CommitRecord {
            id: CommitId::new("abc123def").unwrap(),
            author: "ops".into(),
            message: "Raise limits\n\nLonger body".into(),
            timestamp: Utc::now(),
            path: RepoPath::new("limits.yaml").unwrap(),
        };
        assert_eq!(record.summary(), "Raise limits");
        assert_eq!(record.short(), "abc123");
    }

    #[test]
    fn forge_error_display() {
        assert_eq!(
            format!("{}", ForgeError::AuthRequired),
            "authentication required"
        );
        assert_eq!(
            format!("{}", ForgeError::NotFound("routes.yaml".into())),
            "not found: routes.yaml"
        );
        assert_eq!(
            format!("{}", ForgeError::Conflict("sha mismatch".into())),
            "conflict: sha mismatch"
        );
        assert_eq!(format!("{}", ForgeError::RateLimited), "rate limited");
        assert_eq!(
            format!(
                "{}",
                ForgeError::ApiError {
                    status: 422,
                    message: "Validation failed".into()
                }
            ),
            "API error: 422 - Validation failed"
        );
        assert_eq!(
            format!("{}", ForgeError::NetworkError("connection refused".into())),
            "network error: connection refused"
        );
    }
}
