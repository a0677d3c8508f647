//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`RepoId`] - Repository identity (owner, name)
//! - [`BranchName`] - Validated branch name
//! - [`RepoPath`] - Normalized repository-relative file path
//! - [`CommitId`] - Backend-issued commit identifier
//! - [`ContentToken`] - Opaque content identifier used for compare-and-swap writes
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use confrev::core::types::{BranchName, CommitId, RepoId, RepoPath};
//!
//! let repo = RepoId::parse("acme/gateway-config").unwrap();
//! assert_eq!(repo.owner(), "acme");
//!
//! let branch = BranchName::new("feature/rate-limits").unwrap();
//! let path = RepoPath::new("/routes/api.yaml").unwrap();
//! assert_eq!(path.as_str(), "routes/api.yaml");
//!
//! let id = CommitId::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(id.short(), "abc123");
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(RepoPath::new("../escape").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of the human-friendly abbreviated commit identifier.
pub const SHORT_ID_LEN: usize = 6;

/// Name of the default branch. It can never be deleted.
pub const DEFAULT_BRANCH: &str = "main";

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid repository: {0}")]
    InvalidRepo(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid commit id: {0}")]
    InvalidCommitId(String),

    #[error("invalid content token: {0}")]
    InvalidToken(String),
}

/// Repository identity on the remote forge.
///
/// Immutable for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    /// Create a repository identity from its parts.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepo` if either part is empty or contains
    /// a slash or whitespace.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, TypeError> {
        let owner = owner.into();
        let name = name.into();
        for (label, part) in [("owner", &owner), ("name", &name)] {
            if part.is_empty() {
                return Err(TypeError::InvalidRepo(format!("{label} cannot be empty")));
            }
            if part.contains('/') || part.chars().any(char::is_whitespace) {
                return Err(TypeError::InvalidRepo(format!(
                    "{label} '{part}' cannot contain '/' or whitespace"
                )));
            }
        }
        Ok(Self { owner, name })
    }

    /// Parse an `owner/name` pair.
    ///
    /// ```
    /// use confrev::core::types::RepoId;
    ///
    /// let repo = RepoId::parse("acme/gateway-config").unwrap();
    /// assert_eq!(repo.to_string(), "acme/gateway-config");
    /// assert!(RepoId::parse("acme").is_err());
    /// ```
    pub fn parse(spec: &str) -> Result<Self, TypeError> {
        match spec.split_once('/') {
            Some((owner, name)) => Self::new(owner, name),
            None => Err(TypeError::InvalidRepo(format!(
                "expected 'owner/name', got '{spec}'"
            ))),
        }
    }

    /// Repository owner (user or organization).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A validated branch name.
///
/// Branch names must conform to Git's refname rules (see `git check-ref-format`):
/// - Cannot be empty or whitespace-only
/// - Cannot start with `.` or `-`
/// - Cannot end with `.lock` or `/`
/// - Cannot contain `..`, `@{`, `//`, or ASCII control characters
/// - Cannot contain spaces, `~`, `^`, `:`, `\`, `?`, `*`, `[`
/// - Cannot be exactly `@`
///
/// # Example
///
/// ```
/// use confrev::core::types::BranchName;
///
/// let name = BranchName::new("feature/my-branch").unwrap();
/// assert_eq!(name.as_str(), "feature/my-branch");
/// assert!(!name.is_default());
/// assert!(BranchName::main().is_default());
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("   ").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// The default branch (`main`).
    pub fn main() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }

    /// Whether this is the default (protected) branch.
    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_BRANCH
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let invalid = |msg: &str| Err(TypeError::InvalidBranchName(msg.to_string()));

        if name.trim().is_empty() {
            return invalid("branch name cannot be empty");
        }
        if name == "@" {
            return invalid("branch name cannot be '@' (reserved)");
        }
        if name.starts_with('.') || name.starts_with('-') {
            return invalid("branch name cannot start with '.' or '-'");
        }
        if name.ends_with(".lock") || name.ends_with('/') {
            return invalid("branch name cannot end with '.lock' or '/'");
        }
        for seq in ["..", "@{", "//"] {
            if name.contains(seq) {
                return Err(TypeError::InvalidBranchName(format!(
                    "branch name cannot contain '{seq}'"
                )));
            }
        }

        const INVALID_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(TypeError::InvalidBranchName(format!(
                "branch name cannot contain '{c}'"
            )));
        }
        if name.chars().any(|c| c.is_ascii_control()) {
            return invalid("branch name cannot contain control characters");
        }

        for component in name.split('/').filter(|c| !c.is_empty()) {
            if component.starts_with('.') || component.ends_with(".lock") {
                return invalid("path component cannot start with '.' or end with '.lock'");
            }
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A repository-relative file path.
///
/// Leading and trailing slashes are stripped. Empty segments, `.` and
/// `..` are rejected so a path can never escape the repository root.
/// The empty path denotes the repository root and is only valid for
/// directory listings, see [`RepoPath::root`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoPath(String);

impl RepoPath {
    /// Create a normalized file path.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPath` for empty paths or paths with
    /// `.`/`..`/empty segments.
    pub fn new(path: impl Into<String>) -> Result<Self, TypeError> {
        let path = path.into();
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Err(TypeError::InvalidPath("path cannot be empty".into()));
        }
        for segment in trimmed.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(TypeError::InvalidPath(format!(
                    "'{path}' contains an empty, '.' or '..' segment"
                )));
            }
            if segment.chars().any(|c| c.is_ascii_control()) {
                return Err(TypeError::InvalidPath(
                    "path cannot contain control characters".into(),
                ));
            }
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The repository root (used for directory listings).
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Whether this is the repository root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Final path component.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepoPath {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim_matches('/').is_empty() {
            return Ok(Self::root());
        }
        Self::new(s)
    }
}

impl From<RepoPath> for String {
    fn from(path: RepoPath) -> Self {
        path.0
    }
}

impl std::fmt::Display for RepoPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A full commit identifier as issued by the backend.
///
/// Identifiers are opaque: the backend is authoritative, so only emptiness
/// and whitespace are rejected. Hex identifiers are normally 40 or 64
/// characters long.
///
/// # Example
///
/// ```
/// use confrev::core::types::CommitId;
///
/// let id = CommitId::new("abc123def4567890abc123def4567890abc12345").unwrap();
/// assert_eq!(id.short(), "abc123");
/// assert!(id.starts_with("abc1"));
/// assert!(CommitId::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(String);

impl CommitId {
    /// Create a commit identifier.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidCommitId` if the id is empty or contains whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidCommitId("commit id cannot be empty".into()));
        }
        if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidCommitId(format!(
                "commit id '{id}' contains whitespace"
            )));
        }
        Ok(Self(id))
    }

    /// The abbreviated (first 6 characters) identifier.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }

    /// Case-sensitive prefix test used by reference resolution.
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CommitId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> Self {
        id.0
    }
}

impl AsRef<str> for CommitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque content identifier ("sha") for a file at a branch tip.
///
/// Echoed back on every mutation of that exact (branch, path) so the
/// backend can reject writes based on a superseded version.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentToken(String);

impl ContentToken {
    /// Wrap a backend-issued token.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidToken` if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, TypeError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(TypeError::InvalidToken("token cannot be empty".into()));
        }
        Ok(Self(token))
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated token for display.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(SHORT_ID_LEN) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

// Tokens are shown abbreviated so logs stay readable.
impl std::fmt::Debug for ContentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentToken({})", self.short())
    }
}

impl TryFrom<String> for ContentToken {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentToken> for String {
    fn from(token: ContentToken) -> Self {
        token.0
    }
}

impl std::fmt::Display for ContentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
