//! revision::resolver
//!
//! Maps user-supplied commit references to full commit identifiers.
//!
//! A reference is either the symbol `latest` (the newest commit for the
//! path, index 0 of the server-ordered history) or a case-sensitive prefix
//! of a full identifier, normally the 6-character short id. The first
//! commit in list order whose id starts with the prefix wins; ambiguous
//! prefixes are not detected.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use confrev::core::types::{CommitId, RepoPath};
//! use confrev::forge::CommitRecord;
//! use confrev::revision::resolve;
//!
//! let record = |id: &str| CommitRecord {
//!     id: CommitId::new(id).unwrap(),
//!     author: "ops".into(),
//!     message: "update".into(),
//!     timestamp: Utc::now(),
//!     path: RepoPath::new("routes.yaml").unwrap(),
//! };
//! let history = vec![record("abc123def"), record("abc999xyz")];
//!
//! assert_eq!(resolve("abc123", &history).unwrap().as_str(), "abc123def");
//! assert_eq!(resolve("latest", &history).unwrap().as_str(), "abc123def");
//! assert!(resolve("zzzzzz", &history).is_err());
//! ```

use super::errors::RevisionError;
use crate::core::types::CommitId;
use crate::forge::CommitRecord;

/// Symbolic reference to the newest commit.
pub const LATEST: &str = "latest";

/// A parsed commit reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevisionRef {
    /// The newest commit in the history.
    Latest,
    /// A prefix of a full commit identifier.
    Prefix(String),
}

impl RevisionRef {
    /// Parse user input. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            LATEST => RevisionRef::Latest,
            other => RevisionRef::Prefix(other.to_string()),
        }
    }

    /// Find the commit this reference names in `commits`.
    pub fn find<'a>(&self, commits: &'a [CommitRecord]) -> Option<&'a CommitRecord> {
        match self {
            RevisionRef::Latest => commits.first(),
            // An empty prefix would match everything.
            RevisionRef::Prefix(p) if p.is_empty() => None,
            RevisionRef::Prefix(p) => commits.iter().find(|c| c.id.starts_with(p)),
        }
    }
}

impl std::fmt::Display for RevisionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevisionRef::Latest => write!(f, "{}", LATEST),
            RevisionRef::Prefix(p) => write!(f, "{}", p),
        }
    }
}

/// Resolve `reference` against a per-path history (newest first).
///
/// # Errors
///
/// `NotFound` when the history is empty, the reference is empty, or no
/// commit id starts with it.
pub fn resolve(reference: &str, commits: &[CommitRecord]) -> Result<CommitId, RevisionError> {
    let parsed = RevisionRef::parse(reference);
    parsed
        .find(commits)
        .map(|c| c.id.clone())
        .ok_or_else(|| RevisionError::NotFound(format!("no commit matches '{}'", parsed)))
}
