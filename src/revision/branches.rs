//! revision::branches
//!
//! Branch lifecycle: list, create and delete named branches.
//!
//! Name validation and the protection of `main` are enforced before any
//! network call. The branch list is cached per repository and dropped
//! after every create or delete attempt that reached the backend.
//!
//! Deleting a branch returns [`BranchDeleted`], which names the branch a
//! view of the deleted branch should move to. Navigation itself is left
//! to the caller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::errors::RevisionError;
use crate::core::types::{BranchName, RepoId};
use crate::forge::{Branch, Forge, ForgeError};

/// Outcome of a successful branch deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchDeleted {
    /// The branch that was deleted
    pub deleted: BranchName,
    /// Branch to show instead (always the default branch)
    pub redirect_to: BranchName,
}

/// Creates, deletes and lists branches.
pub struct BranchManager {
    forge: Arc<dyn Forge>,
    cache: Mutex<HashMap<RepoId, Vec<Branch>>>,
}

impl std::fmt::Debug for BranchManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BranchManager")
            .field("forge", &self.forge.name())
            .finish_non_exhaustive()
    }
}

/// Parse a user-supplied branch name, mapping failures to `InvalidName`.
pub fn parse_branch_name(name: &str) -> Result<BranchName, RevisionError> {
    if name.trim().is_empty() {
        return Err(RevisionError::InvalidName(
            "branch name cannot be empty".into(),
        ));
    }
    BranchName::new(name).map_err(|e| RevisionError::InvalidName(e.to_string()))
}

impl BranchManager {
    pub fn new(forge: Arc<dyn Forge>) -> Self {
        Self {
            forge,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<RepoId, Vec<Branch>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Branches of `repo`, served from the cache when present.
    pub async fn list(&self, repo: &RepoId) -> Result<Vec<Branch>, RevisionError> {
        if let Some(cached) = self.cache().get(repo) {
            return Ok(cached.clone());
        }
        let branches = self.forge.list_branches(repo).await?;
        debug!(%repo, count = branches.len(), "fetched branch list");
        self.cache().insert(repo.clone(), branches.clone());
        Ok(branches)
    }

    /// Drop the cached branch list for `repo`.
    pub fn invalidate(&self, repo: &RepoId) {
        self.cache().remove(repo);
    }

    /// Create `name` at the tip of `from` (default `main`).
    ///
    /// # Errors
    ///
    /// - `InvalidName` for an empty or malformed name (before any network call)
    /// - `DuplicateBranch` if a branch with that name exists
    pub async fn create(
        &self,
        repo: &RepoId,
        name: &str,
        from: Option<&str>,
    ) -> Result<Branch, RevisionError> {
        let name = parse_branch_name(name)?;
        let from = match from {
            Some(base) => parse_branch_name(base)?,
            None => BranchName::main(),
        };

        let existing = self.list(repo).await?;
        if existing.iter().any(|b| b.name == name) {
            return Err(RevisionError::DuplicateBranch(name));
        }

        let result = self.forge.create_branch(repo, &name, &from).await;
        self.invalidate(repo);
        match result {
            Ok(branch) => {
                info!(%repo, branch = %name, %from, "created branch");
                Ok(branch)
            }
            // Lost a race with another creator.
            Err(ForgeError::ApiError { status: 422, .. }) => {
                Err(RevisionError::DuplicateBranch(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Delete `name`.
    ///
    /// # Errors
    ///
    /// - `InvalidName` for an empty or malformed name
    /// - `ProtectedBranch` for `main`, before any network call
    pub async fn delete(&self, repo: &RepoId, name: &str) -> Result<BranchDeleted, RevisionError> {
        let name = parse_branch_name(name)?;
        if name.is_default() {
            return Err(RevisionError::ProtectedBranch(name));
        }

        let result = self.forge.delete_branch(repo, &name).await;
        self.invalidate(repo);
        result?;
        info!(%repo, branch = %name, "deleted branch");
        Ok(BranchDeleted {
            deleted: name,
            redirect_to: BranchName::main(),
        })
    }
}
