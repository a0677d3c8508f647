//! revision::tokens
//!
//! Last observed content token per (branch, path).
//!
//! Every mutation must carry the token returned by the most recent
//! successful fetch or mutation of that exact (branch, path). The tracker
//! is written only after a successful response, so a failed mutation
//! leaves it untouched.

use std::collections::HashMap;

use super::errors::RevisionError;
use crate::core::types::{BranchName, ContentToken, RepoPath};

/// Holds at most one token per (branch, path).
#[derive(Debug, Default, Clone)]
pub struct TokenTracker {
    entries: HashMap<(BranchName, RepoPath), ContentToken>,
}

impl TokenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current token, if one is tracked.
    pub fn get(&self, branch: &BranchName, path: &RepoPath) -> Option<&ContentToken> {
        self.entries.get(&(branch.clone(), path.clone()))
    }

    /// Record the token from a successful fetch or mutation.
    pub fn set(&mut self, branch: &BranchName, path: &RepoPath, token: ContentToken) {
        self.entries.insert((branch.clone(), path.clone()), token);
    }

    /// The current token, or `StaleOrMissingToken` if none is tracked.
    pub fn require(
        &self,
        branch: &BranchName,
        path: &RepoPath,
    ) -> Result<ContentToken, RevisionError> {
        self.get(branch, path)
            .cloned()
            .ok_or_else(|| RevisionError::StaleOrMissingToken {
                branch: branch.clone(),
                path: path.clone(),
            })
    }

    /// Forget the token for one file.
    pub fn invalidate(&mut self, branch: &BranchName, path: &RepoPath) {
        self.entries.remove(&(branch.clone(), path.clone()));
    }

    /// Forget every token on a branch.
    pub fn invalidate_branch(&mut self, branch: &BranchName) {
        self.entries.retain(|(b, _), _| b != branch);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(branch: &str, path: &str) -> (BranchName, RepoPath) {
        (BranchName::new(branch).unwrap(), RepoPath::new(path).unwrap())
    }

    fn token(s: &str) -> ContentToken {
        ContentToken::new(s).unwrap()
    }

    #[test]
    fn set_then_require() {
        let mut tracker = TokenTracker::new();
        let (b, p) = key("main", "a.yaml");
        tracker.set(&b, &p, token("sha1"));
        assert_eq!(tracker.require(&b, &p).unwrap(), token("sha1"));
    }

    #[test]
    fn set_replaces() {
        let mut tracker = TokenTracker::new();
        let (b, p) = key("main", "a.yaml");
        tracker.set(&b, &p, token("sha1"));
        tracker.set(&b, &p, token("sha2"));
        assert_eq!(tracker.get(&b, &p), Some(&token("sha2")));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn require_missing_fails() {
        let tracker = TokenTracker::new();
        let (b, p) = key("main", "a.yaml");
        assert!(matches!(
            tracker.require(&b, &p),
            Err(RevisionError::StaleOrMissingToken { .. })
        ));
    }

    #[test]
    fn entries_are_per_branch() {
        let mut tracker = TokenTracker::new();
        let (main, p) = key("main", "a.yaml");
        let (feature, _) = key("feature", "a.yaml");
        tracker.set(&main, &p, token("sha1"));
        assert!(tracker.get(&feature, &p).is_none());
    }

    #[test]
    fn invalidate_branch_keeps_other_branches() {
        let mut tracker = TokenTracker::new();
        let (main, a) = key("main", "a.yaml");
        let (feature, b) = key("feature", "b.yaml");
        tracker.set(&main, &a, token("sha1"));
        tracker.set(&feature, &a, token("sha2"));
        tracker.set(&feature, &b, token("sha3"));

        tracker.invalidate_branch(&feature);
        assert_eq!(tracker.len(), 1);
        assert!(tracker.get(&main, &a).is_some());
    }

    #[test]
    fn invalidate_single() {
        let mut tracker = TokenTracker::new();
        let (b, p) = key("main", "a.yaml");
        tracker.set(&b, &p, token("sha1"));
        tracker.invalidate(&b, &p);
        assert!(tracker.is_empty());
    }
}
