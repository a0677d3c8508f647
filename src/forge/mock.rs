//! forge::mock
//!
//! In-memory forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock keeps a small commit graph in memory: every commit stores a
//! full snapshot of the tree and a parent link, and branches point at
//! commits. Content tokens are derived from file content (like blob
//! hashes), so writing stale content tokens is rejected with
//! `ForgeError::Conflict` exactly as a real backend would.
//!
//! Failures can be injected per operation, operations are recorded for
//! verification, and file fetches can be held on a latch to simulate a
//! slow response.
//!
//! # Example
//!
//! ```
//! use confrev::core::types::{BranchName, RepoId, RepoPath};
//! use confrev::forge::mock::MockForge;
//! use confrev::forge::Forge;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new();
//! let path = RepoPath::new("gateway/routes.yaml").unwrap();
//! forge.seed_file(&BranchName::main(), &path, "routes: []\n", "Add routes");
//!
//! let repo = RepoId::parse("acme/config").unwrap();
//! let revision = forge.get_file_content(&repo, "main", &path).await.unwrap();
//! assert_eq!(revision.content, "routes: []\n");
//! # });
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::traits::{
    Branch, ChangedFile, CommitDetail, CommitRecord, DeleteFileRequest, FileEntry, FileKind,
    FileRevision, Forge, ForgeError, PutFileRequest, RollbackOutcome, RollbackRequest,
};
use crate::core::types::{BranchName, CommitId, ContentToken, RepoId, RepoPath};

/// Fixed epoch for generated commit timestamps (2024-01-01T00:00:00Z).
const EPOCH_SECS: i64 = 1_704_067_200;

/// Author recorded on commits created through the mock.
const MOCK_AUTHOR: &str = "mock-user";

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping.
#[derive(Debug, Clone)]
pub struct MockForge {
    inner: Arc<Mutex<MockForgeInner>>,
}

#[derive(Debug)]
struct MockForgeInner {
    commits: HashMap<CommitId, MockCommit>,
    branches: BTreeMap<BranchName, CommitId>,
    protected: Vec<BranchName>,
    clock: i64,
    fail_on: Option<FailOn>,
    fetch_latch: Option<Arc<Notify>>,
    operations: Vec<MockOperation>,
}

#[derive(Debug, Clone)]
struct MockCommit {
    id: CommitId,
    parent: Option<CommitId>,
    author: String,
    message: String,
    timestamp: DateTime<Utc>,
    tree: BTreeMap<RepoPath, String>,
    changed: Vec<RepoPath>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_files with the given error.
    ListFiles(ForgeError),
    /// Fail get_file_content with the given error.
    GetFileContent(ForgeError),
    /// Fail put_file with the given error.
    PutFile(ForgeError),
    /// Fail delete_file with the given error.
    DeleteFile(ForgeError),
    /// Fail list_commits with the given error.
    ListCommits(ForgeError),
    /// Fail get_diff with the given error.
    GetDiff(ForgeError),
    /// Fail rollback with the given error.
    Rollback(ForgeError),
    /// Fail list_branches with the given error.
    ListBranches(ForgeError),
    /// Fail create_branch with the given error.
    CreateBranch(ForgeError),
    /// Fail delete_branch with the given error.
    DeleteBranch(ForgeError),
}

impl FailOn {
    fn matches(&self, op: &str) -> Option<&ForgeError> {
        let (name, err) = match self {
            FailOn::ListFiles(e) => ("list_files", e),
            FailOn::GetFileContent(e) => ("get_file_content", e),
            FailOn::PutFile(e) => ("put_file", e),
            FailOn::DeleteFile(e) => ("delete_file", e),
            FailOn::ListCommits(e) => ("list_commits", e),
            FailOn::GetDiff(e) => ("get_diff", e),
            FailOn::Rollback(e) => ("rollback", e),
            FailOn::ListBranches(e) => ("list_branches", e),
            FailOn::CreateBranch(e) => ("create_branch", e),
            FailOn::DeleteBranch(e) => ("delete_branch", e),
        };
        (name == op).then_some(err)
    }
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListFiles {
        branch: String,
        dir: String,
    },
    GetFileContent {
        reference: String,
        path: String,
    },
    PutFile {
        branch: String,
        path: String,
        token: String,
        message: String,
    },
    DeleteFile {
        branch: String,
        path: String,
        token: String,
    },
    ListCommits {
        branch: String,
        path: String,
    },
    GetCommit {
        id: String,
    },
    GetDiff {
        path: String,
        old: String,
        new: String,
    },
    Rollback {
        branch: String,
        path: String,
        target: String,
    },
    ListBranches,
    CreateBranch {
        name: String,
        from: String,
    },
    DeleteBranch {
        name: String,
    },
}

impl MockOperation {
    /// Whether this operation writes to the remote.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            MockOperation::PutFile { .. }
                | MockOperation::DeleteFile { .. }
                | MockOperation::Rollback { .. }
                | MockOperation::CreateBranch { .. }
                | MockOperation::DeleteBranch { .. }
        )
    }
}

/// Compute the content token for a file body.
///
/// Derived from content only, so restoring an old version restores its token.
pub fn content_token(content: &str) -> ContentToken {
    let mut hasher = Sha256::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content.as_bytes());
    let digest = hex::encode(hasher.finalize());
    ContentToken::new(digest).expect("hex digest is never empty")
}

impl MockForge {
    /// Create a mock forge with a `main` branch holding one empty root commit.
    pub fn new() -> Self {
        let mut inner = MockForgeInner {
            commits: HashMap::new(),
            branches: BTreeMap::new(),
            protected: vec![BranchName::main()],
            clock: 0,
            fail_on: None,
            fetch_latch: None,
            operations: Vec::new(),
        };
        let root = inner.commit(None, "Initial commit", BTreeMap::new(), Vec::new());
        inner.branches.insert(BranchName::main(), root);
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use confrev::forge::mock::{MockForge, FailOn};
    /// use confrev::forge::ForgeError;
    ///
    /// let forge = MockForge::new()
    ///     .fail_on(FailOn::PutFile(ForgeError::NetworkError("reset".into())));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.inner.lock().unwrap().fail_on = Some(fail_on);
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        self.inner.lock().unwrap().fail_on = None;
    }

    /// Hold every subsequent `get_file_content` until the returned latch is notified.
    ///
    /// Each `notify_one` releases one fetch.
    pub fn latch_file_fetches(&self) -> Arc<Notify> {
        let latch = Arc::new(Notify::new());
        self.inner.lock().unwrap().fetch_latch = Some(latch.clone());
        latch
    }

    /// Commit a file directly on a branch without recording an operation.
    pub fn seed_file(
        &self,
        branch: &BranchName,
        path: &RepoPath,
        content: &str,
        message: &str,
    ) -> CommitId {
        let mut inner = self.inner.lock().unwrap();
        inner
            .write_file(branch, path, Some(content.to_string()), message)
            .expect("seed branch must exist")
    }

    /// Create a branch directly without recording an operation.
    pub fn seed_branch(&self, name: &BranchName, from: &BranchName) {
        let mut inner = self.inner.lock().unwrap();
        let tip = inner.branches.get(from).cloned().expect("seed base must exist");
        inner.branches.insert(name.clone(), tip);
    }

    /// Current content of a file at a branch tip (for test verification).
    pub fn file_content(&self, branch: &BranchName, path: &RepoPath) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        let tip = inner.branches.get(branch)?;
        inner.commits.get(tip)?.tree.get(path).cloned()
    }

    /// Current token of a file at a branch tip (for test verification).
    pub fn file_token(&self, branch: &BranchName, path: &RepoPath) -> Option<ContentToken> {
        self.file_content(branch, path).map(|c| content_token(&c))
    }

    /// Names of all branches (for test verification).
    pub fn branch_names(&self) -> Vec<BranchName> {
        self.inner.lock().unwrap().branches.keys().cloned().collect()
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.inner.lock().unwrap().operations.clone()
    }

    /// Count recorded operations that write to the remote.
    pub fn mutation_count(&self) -> usize {
        self.operations().iter().filter(|op| op.is_mutation()).count()
    }

    /// Clear recorded operations.
    pub fn clear_operations(&self) {
        self.inner.lock().unwrap().operations.clear();
    }

    fn record(&self, op: MockOperation) {
        self.inner.lock().unwrap().operations.push(op);
    }

    fn check_fail(&self, op: &str) -> Result<(), ForgeError> {
        let inner = self.inner.lock().unwrap();
        match inner.fail_on.as_ref().and_then(|f| f.matches(op)) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForgeInner {
    fn commit(
        &mut self,
        parent: Option<CommitId>,
        message: &str,
        tree: BTreeMap<RepoPath, String>,
        changed: Vec<RepoPath>,
    ) -> CommitId {
        self.clock += 1;
        let mut hasher = Sha256::new();
        hasher.update(parent.as_ref().map(|p| p.as_str()).unwrap_or("").as_bytes());
        hasher.update(message.as_bytes());
        hasher.update(self.clock.to_le_bytes());
        let id = CommitId::new(hex::encode(hasher.finalize())).expect("hex digest is never empty");

        let timestamp =
            DateTime::from_timestamp(EPOCH_SECS + self.clock * 60, 0).unwrap_or_default();
        self.commits.insert(
            id.clone(),
            MockCommit {
                id: id.clone(),
                parent,
                author: MOCK_AUTHOR.to_string(),
                message: message.to_string(),
                timestamp,
                tree,
                changed,
            },
        );
        id
    }

    fn tip(&self, branch: &BranchName) -> Result<&MockCommit, ForgeError> {
        self.branches
            .get(branch)
            .and_then(|id| self.commits.get(id))
            .ok_or_else(|| ForgeError::NotFound(format!("branch '{}'", branch)))
    }

    /// Resolve a branch name or full commit id to a commit.
    fn lookup(&self, reference: &str) -> Result<&MockCommit, ForgeError> {
        if let Ok(branch) = BranchName::new(reference) {
            if self.branches.contains_key(&branch) {
                return self.tip(&branch);
            }
        }
        CommitId::new(reference)
            .ok()
            .and_then(|id| self.commits.get(&id))
            .ok_or_else(|| ForgeError::NotFound(format!("ref '{}'", reference)))
    }

    /// Write (or delete, when `content` is `None`) a file as a new commit.
    fn write_file(
        &mut self,
        branch: &BranchName,
        path: &RepoPath,
        content: Option<String>,
        message: &str,
    ) -> Result<CommitId, ForgeError> {
        let tip = self.tip(branch)?;
        let parent = tip.id.clone();
        let mut tree = tip.tree.clone();
        match content {
            Some(body) => {
                tree.insert(path.clone(), body);
            }
            None => {
                tree.remove(path);
            }
        }
        let id = self.commit(Some(parent), message, tree, vec![path.clone()]);
        self.branches.insert(branch.clone(), id.clone());
        Ok(id)
    }

    fn check_token(
        &self,
        branch: &BranchName,
        path: &RepoPath,
        token: &ContentToken,
        missing_ok: bool,
    ) -> Result<(), ForgeError> {
        match self.tip(branch)?.tree.get(path) {
            Some(current) if content_token(current) == *token => Ok(()),
            Some(_) => Err(ForgeError::Conflict(format!(
                "{} does not match {} at {}",
                token.short(),
                path,
                branch
            ))),
            None if missing_ok => Ok(()),
            None => Err(ForgeError::NotFound(format!("{} at {}", path, branch))),
        }
    }

    fn record_for(&self, commit: &MockCommit, path: &RepoPath) -> CommitRecord {
        CommitRecord {
            id: commit.id.clone(),
            author: commit.author.clone(),
            message: commit.message.clone(),
            timestamp: commit.timestamp,
            path: path.clone(),
        }
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_files(
        &self,
        _repo: &RepoId,
        branch: &BranchName,
        dir: &RepoPath,
    ) -> Result<Vec<FileEntry>, ForgeError> {
        self.record(MockOperation::ListFiles {
            branch: branch.to_string(),
            dir: dir.as_str().to_string(),
        });
        self.check_fail("list_files")?;

        let inner = self.inner.lock().unwrap();
        let tip = inner.tip(branch)?;
        let prefix = if dir.is_root() {
            String::new()
        } else {
            format!("{}/", dir.as_str())
        };

        let mut entries: BTreeMap<String, FileEntry> = BTreeMap::new();
        for path in tip.tree.keys() {
            let Some(rest) = path.as_str().strip_prefix(&prefix) else {
                continue;
            };
            let (name, kind) = match rest.split_once('/') {
                Some((child_dir, _)) => (child_dir, FileKind::Dir),
                None => (rest, FileKind::File),
            };
            let full = RepoPath::new(format!("{}{}", prefix, name))
                .map_err(|e| ForgeError::NotFound(e.to_string()))?;
            entries.entry(name.to_string()).or_insert(FileEntry {
                name: name.to_string(),
                kind,
                path: full,
                last_modified: None,
            });
        }

        if entries.is_empty() && !dir.is_root() {
            return Err(ForgeError::NotFound(format!("directory {}", dir)));
        }
        Ok(entries.into_values().collect())
    }

    async fn get_file_content(
        &self,
        _repo: &RepoId,
        reference: &str,
        path: &RepoPath,
    ) -> Result<FileRevision, ForgeError> {
        self.record(MockOperation::GetFileContent {
            reference: reference.to_string(),
            path: path.as_str().to_string(),
        });

        let latch = self.inner.lock().unwrap().fetch_latch.clone();
        if let Some(latch) = latch {
            latch.notified().await;
        }
        self.check_fail("get_file_content")?;

        let inner = self.inner.lock().unwrap();
        let commit = inner.lookup(reference)?;
        let content = commit
            .tree
            .get(path)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("{} at {}", path, reference)))?;
        Ok(FileRevision {
            path: path.clone(),
            reference: reference.to_string(),
            token: content_token(&content),
            content,
        })
    }

    async fn put_file(
        &self,
        _repo: &RepoId,
        request: PutFileRequest,
    ) -> Result<ContentToken, ForgeError> {
        self.record(MockOperation::PutFile {
            branch: request.branch.to_string(),
            path: request.path.as_str().to_string(),
            token: request.token.to_string(),
            message: request.message.clone(),
        });
        self.check_fail("put_file")?;

        let mut inner = self.inner.lock().unwrap();
        inner.check_token(&request.branch, &request.path, &request.token, false)?;
        let token = content_token(&request.content);
        inner.write_file(
            &request.branch,
            &request.path,
            Some(request.content),
            &request.message,
        )?;
        Ok(token)
    }

    async fn delete_file(
        &self,
        _repo: &RepoId,
        request: DeleteFileRequest,
    ) -> Result<(), ForgeError> {
        self.record(MockOperation::DeleteFile {
            branch: request.branch.to_string(),
            path: request.path.as_str().to_string(),
            token: request.token.to_string(),
        });
        self.check_fail("delete_file")?;

        let mut inner = self.inner.lock().unwrap();
        inner.check_token(&request.branch, &request.path, &request.token, false)?;
        inner.write_file(&request.branch, &request.path, None, &request.message)?;
        Ok(())
    }

    async fn list_commits(
        &self,
        _repo: &RepoId,
        branch: &BranchName,
        path: &RepoPath,
    ) -> Result<Vec<CommitRecord>, ForgeError> {
        self.record(MockOperation::ListCommits {
            branch: branch.to_string(),
            path: path.as_str().to_string(),
        });
        self.check_fail("list_commits")?;

        let inner = self.inner.lock().unwrap();
        let mut records = Vec::new();
        let mut cursor = Some(inner.tip(branch)?);
        while let Some(commit) = cursor {
            if commit.changed.contains(path) {
                records.push(inner.record_for(commit, path));
            }
            cursor = commit.parent.as_ref().and_then(|p| inner.commits.get(p));
        }
        Ok(records)
    }

    async fn get_commit(&self, _repo: &RepoId, id: &CommitId) -> Result<CommitDetail, ForgeError> {
        self.record(MockOperation::GetCommit { id: id.to_string() });

        let inner = self.inner.lock().unwrap();
        let commit = inner
            .commits
            .get(id)
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", id)))?;
        let parent_tree = commit
            .parent
            .as_ref()
            .and_then(|p| inner.commits.get(p))
            .map(|p| p.tree.clone())
            .unwrap_or_default();

        let files = commit
            .changed
            .iter()
            .map(|path| {
                let old = parent_tree.get(path).map(String::as_str).unwrap_or("");
                let new = commit.tree.get(path).map(String::as_str).unwrap_or("");
                let diff = similar::TextDiff::from_lines(old, new);
                let mut additions = 0;
                let mut deletions = 0;
                for change in diff.iter_all_changes() {
                    match change.tag() {
                        similar::ChangeTag::Insert => additions += 1,
                        similar::ChangeTag::Delete => deletions += 1,
                        similar::ChangeTag::Equal => {}
                    }
                }
                let status = match (parent_tree.contains_key(path), commit.tree.contains_key(path))
                {
                    (false, true) => "added",
                    (true, false) => "removed",
                    _ => "modified",
                };
                ChangedFile {
                    path: path.as_str().to_string(),
                    status: status.to_string(),
                    additions,
                    deletions,
                }
            })
            .collect();

        Ok(CommitDetail {
            id: commit.id.clone(),
            author: commit.author.clone(),
            message: commit.message.clone(),
            timestamp: commit.timestamp,
            parents: commit.parent.iter().cloned().collect(),
            files,
        })
    }

    async fn get_diff(
        &self,
        _repo: &RepoId,
        path: &RepoPath,
        old: &CommitId,
        new: &CommitId,
    ) -> Result<String, ForgeError> {
        self.record(MockOperation::GetDiff {
            path: path.as_str().to_string(),
            old: old.to_string(),
            new: new.to_string(),
        });
        self.check_fail("get_diff")?;

        let inner = self.inner.lock().unwrap();
        let old_text = inner.lookup(old.as_str())?.tree.get(path).cloned().unwrap_or_default();
        let new_text = inner.lookup(new.as_str())?.tree.get(path).cloned().unwrap_or_default();

        let diff = similar::TextDiff::from_lines(&old_text, &new_text);
        let old_header = format!("a/{}", path);
        let new_header = format!("b/{}", path);
        Ok(diff
            .unified_diff()
            .header(&old_header, &new_header)
            .to_string())
    }

    async fn rollback(
        &self,
        _repo: &RepoId,
        request: RollbackRequest,
    ) -> Result<RollbackOutcome, ForgeError> {
        self.record(MockOperation::Rollback {
            branch: request.branch.to_string(),
            path: request.path.as_str().to_string(),
            target: request.target.to_string(),
        });
        self.check_fail("rollback")?;

        let mut inner = self.inner.lock().unwrap();
        let restored = inner
            .lookup(request.target.as_str())?
            .tree
            .get(&request.path)
            .cloned()
            .ok_or_else(|| {
                ForgeError::NotFound(format!("{} at {}", request.path, request.target))
            })?;
        let new_token = content_token(&restored);
        let id = inner.write_file(
            &request.branch,
            &request.path,
            Some(restored),
            &request.message,
        )?;
        let commit = inner
            .commits
            .get(&id)
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", id)))?;
        Ok(RollbackOutcome {
            new_token,
            new_commit: inner.record_for(commit, &request.path),
        })
    }

    async fn list_branches(&self, _repo: &RepoId) -> Result<Vec<Branch>, ForgeError> {
        self.record(MockOperation::ListBranches);
        self.check_fail("list_branches")?;

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .branches
            .iter()
            .map(|(name, tip)| Branch {
                name: name.clone(),
                tip: Some(tip.clone()),
                protected: inner.protected.contains(name),
            })
            .collect())
    }

    async fn create_branch(
        &self,
        _repo: &RepoId,
        name: &BranchName,
        from: &BranchName,
    ) -> Result<Branch, ForgeError> {
        self.record(MockOperation::CreateBranch {
            name: name.to_string(),
            from: from.to_string(),
        });
        self.check_fail("create_branch")?;

        let mut inner = self.inner.lock().unwrap();
        if inner.branches.contains_key(name) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Reference already exists".into(),
            });
        }
        let tip = inner.tip(from)?.id.clone();
        inner.branches.insert(name.clone(), tip.clone());
        Ok(Branch {
            name: name.clone(),
            tip: Some(tip),
            protected: false,
        })
    }

    async fn delete_branch(&self, _repo: &RepoId, name: &BranchName) -> Result<(), ForgeError> {
        self.record(MockOperation::DeleteBranch {
            name: name.to_string(),
        });
        self.check_fail("delete_branch")?;

        let mut inner = self.inner.lock().unwrap();
        if inner.protected.contains(name) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("branch '{}' is protected", name),
            });
        }
        inner
            .branches
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ForgeError::NotFound(format!("branch '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoId {
        RepoId::parse("acme/config").unwrap()
    }

    fn path(p: &str) -> RepoPath {
        RepoPath::new(p).unwrap()
    }

    #[tokio::test]
    async fn seeded_file_is_readable() {
        let forge = MockForge::new();
        forge.seed_file(&BranchName::main(), &path("a.yaml"), "x: 1\n", "add");

        let rev = forge
            .get_file_content(&repo(), "main", &path("a.yaml"))
            .await
            .unwrap();
        assert_eq!(rev.content, "x: 1\n");
        assert_eq!(rev.token, content_token("x: 1\n"));
    }

    #[tokio::test]
    async fn put_with_current_token_succeeds() {
        let forge = MockForge::new();
        forge.seed_file(&BranchName::main(), &path("a.yaml"), "x: 1\n", "add");

        let token = forge
            .put_file(
                &repo(),
                PutFileRequest {
                    branch: BranchName::main(),
                    path: path("a.yaml"),
                    token: content_token("x: 1\n"),
                    message: "bump".into(),
                    content: "x: 2\n".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(token, content_token("x: 2\n"));
        assert_eq!(
            forge.file_content(&BranchName::main(), &path("a.yaml")),
            Some("x: 2\n".to_string())
        );
    }

    #[tokio::test]
    async fn put_with_stale_token_conflicts() {
        let forge = MockForge::new();
        forge.seed_file(&BranchName::main(), &path("a.yaml"), "x: 1\n", "add");
        forge.seed_file(&BranchName::main(), &path("a.yaml"), "x: 3\n", "other edit");

        let result = forge
            .put_file(
                &repo(),
                PutFileRequest {
                    branch: BranchName::main(),
                    path: path("a.yaml"),
                    token: content_token("x: 1\n"),
                    message: "bump".into(),
                    content: "x: 2\n".into(),
                },
            )
            .await;

        assert!(matches!(result, Err(ForgeError::Conflict(_))));
        assert_eq!(
            forge.file_content(&BranchName::main(), &path("a.yaml")),
            Some("x: 3\n".to_string())
        );
    }

    #[tokio::test]
    async fn commits_are_newest_first_and_path_scoped() {
        let forge = MockForge::new();
        let main = BranchName::main();
        let first = forge.seed_file(&main, &path("a.yaml"), "1\n", "one");
        forge.seed_file(&main, &path("b.yaml"), "b\n", "unrelated");
        let second = forge.seed_file(&main, &path("a.yaml"), "2\n", "two");

        let commits = forge
            .list_commits(&repo(), &main, &path("a.yaml"))
            .await
            .unwrap();
        let ids: Vec<_> = commits.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn diff_between_commits() {
        let forge = MockForge::new();
        let main = BranchName::main();
        let old = forge.seed_file(&main, &path("a.yaml"), "a\nb\n", "one");
        let new = forge.seed_file(&main, &path("a.yaml"), "a\nc\n", "two");

        let diff = forge
            .get_diff(&repo(), &path("a.yaml"), &old, &new)
            .await
            .unwrap();
        assert!(diff.contains("--- a/a.yaml"));
        assert!(diff.contains("-b"));
        assert!(diff.contains("+c"));
    }

    #[tokio::test]
    async fn diff_of_identical_commits_is_empty() {
        let forge = MockForge::new();
        let main = BranchName::main();
        let id = forge.seed_file(&main, &path("a.yaml"), "a\n", "one");

        let diff = forge.get_diff(&repo(), &path("a.yaml"), &id, &id).await.unwrap();
        assert!(diff.is_empty());
    }

    #[tokio::test]
    async fn rollback_appends_commit_with_old_content() {
        let forge = MockForge::new();
        let main = BranchName::main();
        let old = forge.seed_file(&main, &path("a.yaml"), "v1\n", "one");
        forge.seed_file(&main, &path("a.yaml"), "v2\n", "two");

        let outcome = forge
            .rollback(
                &repo(),
                RollbackRequest {
                    branch: main.clone(),
                    path: path("a.yaml"),
                    target: old,
                    message: "restore v1".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.new_token, content_token("v1\n"));
        assert_eq!(outcome.new_commit.message, "restore v1");
        let commits = forge.list_commits(&repo(), &main, &path("a.yaml")).await.unwrap();
        assert_eq!(commits.len(), 3);
    }

    #[tokio::test]
    async fn list_files_groups_directories() {
        let forge = MockForge::new();
        let main = BranchName::main();
        forge.seed_file(&main, &path("gateway/routes.yaml"), "", "r");
        forge.seed_file(&main, &path("gateway/plugins/auth.yaml"), "", "p");
        forge.seed_file(&main, &path("README"), "", "readme");

        let root = forge.list_files(&repo(), &main, &RepoPath::root()).await.unwrap();
        let names: Vec<_> = root.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(names, vec![("README", FileKind::File), ("gateway", FileKind::Dir)]);

        let gateway = forge.list_files(&repo(), &main, &path("gateway")).await.unwrap();
        assert_eq!(gateway.len(), 2);
        assert_eq!(gateway[0].path.as_str(), "gateway/plugins");
    }

    #[tokio::test]
    async fn branches_create_and_delete() {
        let forge = MockForge::new();
        let feature = BranchName::new("feature").unwrap();

        forge
            .create_branch(&repo(), &feature, &BranchName::main())
            .await
            .unwrap();
        assert!(forge.branch_names().contains(&feature));

        forge.delete_branch(&repo(), &feature).await.unwrap();
        assert!(!forge.branch_names().contains(&feature));
    }

    #[tokio::test]
    async fn main_is_protected() {
        let forge = MockForge::new();
        let result = forge.delete_branch(&repo(), &BranchName::main()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn fail_on_injects_error() {
        let forge =
            MockForge::new().fail_on(FailOn::ListBranches(ForgeError::NetworkError("down".into())));
        let result = forge.list_branches(&repo()).await;
        assert!(matches!(result, Err(ForgeError::NetworkError(_))));
    }

    #[tokio::test]
    async fn operations_recorded() {
        let forge = MockForge::new();
        let _ = forge.list_branches(&repo()).await;
        assert_eq!(forge.operations(), vec![MockOperation::ListBranches]);
        assert_eq!(forge.mutation_count(), 0);
    }

    #[test]
    fn forge_name() {
        assert_eq!(MockForge::new().name(), "mock");
    }
}
