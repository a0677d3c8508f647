//! revision::orchestrator
//!
//! Sequences the View/Edit, Commit-History/Diff and Rollback workflows.
//!
//! # Design
//!
//! The orchestrator owns the token tracker, the per-(branch, path) commit
//! cache and the session table. All of it sits behind one
//! `std::sync::Mutex` that is never held across an `.await`, so every
//! workflow method takes `&self` and independent calls interleave at
//! await points.
//!
//! Each session-scoped step runs in three phases:
//!
//! 1. **begin**: under the lock, reject with `Busy` if the session has a
//!    call outstanding, check the state transition and any preconditions
//!    (message, token), then mark the session in flight.
//! 2. **remote**: the forge call, with the lock released.
//! 3. **complete**: under the lock, discard the response with
//!    `SessionClosed` if the session was closed meanwhile; otherwise
//!    clear the in-flight flag and apply the result. The tracker is only
//!    written here, and only on success.
//!
//! Mutations are never retried.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use confrev::core::types::{BranchName, RepoId, RepoPath};
//! use confrev::forge::mock::MockForge;
//! use confrev::revision::Orchestrator;
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new();
//! let path = RepoPath::new("limits.yaml").unwrap();
//! forge.seed_file(&BranchName::main(), &path, "rps: 100\n", "Add limits");
//!
//! let orch = Orchestrator::new(Arc::new(forge), RepoId::parse("acme/config").unwrap());
//! let session = orch.open_session(BranchName::main(), path.clone());
//! orch.open_file(session).await.unwrap();
//! orch.edit(session, "rps: 200\n").unwrap();
//! let token = orch.save_file(session, "Raise limit").await.unwrap();
//!
//! assert_eq!(orch.current_token(&BranchName::main(), &path), Some(token));
//! # });
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, debug_span, info, warn, Instrument};

use super::branches::{BranchDeleted, BranchManager};
use super::diff::{align_text, DiffRow, DiffStats};
use super::errors::RevisionError;
use super::resolver::{resolve, RevisionRef};
use super::session::{SessionId, SessionInfo, SessionState};
use super::tokens::TokenTracker;
use crate::core::types::{BranchName, CommitId, ContentToken, RepoId, RepoPath};
use crate::forge::{
    Branch, CommitDetail, CommitRecord, DeleteFileRequest, FileEntry, FileRevision, Forge,
    PutFileRequest, RollbackOutcome, RollbackRequest,
};

type CommitCache = HashMap<(BranchName, RepoPath), Vec<CommitRecord>>;

/// Aligned diff of one file between two commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffView {
    pub path: RepoPath,
    pub old: CommitId,
    pub new: CommitId,
    pub rows: Vec<DiffRow>,
    pub stats: DiffStats,
}

impl DiffView {
    /// Whether the file is identical at both commits.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug)]
struct Session {
    branch: BranchName,
    path: RepoPath,
    state: SessionState,
    in_flight: bool,
    observed: Option<ContentToken>,
    content: Option<String>,
    draft: Option<String>,
}

impl Session {
    fn unload(&mut self) {
        self.state = SessionState::Unloaded;
        self.observed = None;
        self.content = None;
        self.draft = None;
    }
}

#[derive(Debug, Default)]
struct Shared {
    tracker: TokenTracker,
    commits: CommitCache,
    sessions: HashMap<SessionId, Session>,
}

/// Target of an in-flight step, captured when it begins.
struct Target {
    branch: BranchName,
    path: RepoPath,
}

/// The workflow entry point for the presentation layer.
pub struct Orchestrator {
    forge: Arc<dyn Forge>,
    repo: RepoId,
    branches: BranchManager,
    shared: Mutex<Shared>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("forge", &self.forge.name())
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

fn require_message(message: &str) -> Result<(), RevisionError> {
    if message.trim().is_empty() {
        return Err(RevisionError::Validation(
            "commit message cannot be empty".into(),
        ));
    }
    Ok(())
}

impl Orchestrator {
    pub fn new(forge: Arc<dyn Forge>, repo: RepoId) -> Self {
        Self {
            branches: BranchManager::new(forge.clone()),
            forge,
            repo,
            shared: Mutex::new(Shared::default()),
        }
    }

    /// The repository this orchestrator works on.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Start a session on one file. Nothing is fetched yet.
    pub fn open_session(&self, branch: BranchName, path: RepoPath) -> SessionId {
        let id = SessionId::new();
        debug!(session = %id, %branch, %path, "session opened");
        self.lock().sessions.insert(
            id,
            Session {
                branch,
                path,
                state: SessionState::Unloaded,
                in_flight: false,
                observed: None,
                content: None,
                draft: None,
            },
        );
        id
    }

    /// Close a session.
    ///
    /// An outstanding call is not cancelled; its response is discarded
    /// when it arrives and nothing is written to the tracker.
    pub fn close_session(&self, id: SessionId) -> Result<(), RevisionError> {
        let session = self
            .lock()
            .sessions
            .remove(&id)
            .ok_or(RevisionError::UnknownSession(id))?;
        if session.in_flight {
            debug!(session = %id, "session closed with a call in flight");
        }
        Ok(())
    }

    /// Snapshot of a session.
    pub fn session(&self, id: SessionId) -> Result<SessionInfo, RevisionError> {
        let shared = self.lock();
        let s = shared
            .sessions
            .get(&id)
            .ok_or(RevisionError::UnknownSession(id))?;
        Ok(SessionInfo {
            id,
            branch: s.branch.clone(),
            path: s.path.clone(),
            state: s.state,
            observed_token: s.observed.clone(),
            content: s.content.clone(),
            draft: s.draft.clone(),
            in_flight: s.in_flight,
        })
    }

    /// The tracked token for (branch, path), if any.
    pub fn current_token(&self, branch: &BranchName, path: &RepoPath) -> Option<ContentToken> {
        self.lock().tracker.get(branch, path).cloned()
    }

    /// The cached history for (branch, path), if it has been fetched.
    pub fn cached_commits(&self, branch: &BranchName, path: &RepoPath) -> Option<Vec<CommitRecord>> {
        self.lock()
            .commits
            .get(&(branch.clone(), path.clone()))
            .cloned()
    }

    /// Resolve a reference against the cached history of a session's file.
    ///
    /// # Errors
    ///
    /// `NotFound` if the history has not been fetched or nothing matches.
    pub fn resolve(&self, id: SessionId, reference: &str) -> Result<CommitId, RevisionError> {
        let shared = self.lock();
        let s = shared
            .sessions
            .get(&id)
            .ok_or(RevisionError::UnknownSession(id))?;
        let commits = shared
            .commits
            .get(&(s.branch.clone(), s.path.clone()))
            .map(Vec::as_slice)
            .unwrap_or_default();
        resolve(reference, commits)
    }

    fn begin<T>(
        &self,
        id: SessionId,
        action: &'static str,
        allowed: &[SessionState],
        prepare: impl FnOnce(&mut Session, &TokenTracker) -> Result<T, RevisionError>,
    ) -> Result<(Target, T), RevisionError> {
        let mut guard = self.lock();
        let Shared {
            sessions, tracker, ..
        } = &mut *guard;
        let session = sessions
            .get_mut(&id)
            .ok_or(RevisionError::UnknownSession(id))?;
        if session.in_flight {
            return Err(RevisionError::Busy(id));
        }
        if !allowed.contains(&session.state) {
            return Err(RevisionError::InvalidTransition {
                from: session.state,
                action,
            });
        }
        let prepared = prepare(session, tracker)?;
        session.in_flight = true;
        Ok((
            Target {
                branch: session.branch.clone(),
                path: session.path.clone(),
            },
            prepared,
        ))
    }

    fn complete<R, T>(
        &self,
        id: SessionId,
        outcome: Result<R, RevisionError>,
        on_ok: impl FnOnce(&mut Session, &mut TokenTracker, &mut CommitCache, R) -> T,
        on_err: impl FnOnce(&mut Session, &RevisionError),
    ) -> Result<T, RevisionError> {
        let mut guard = self.lock();
        let Shared {
            sessions,
            tracker,
            commits,
        } = &mut *guard;
        let Some(session) = sessions.get_mut(&id) else {
            debug!(session = %id, "discarding response for closed session");
            return Err(RevisionError::SessionClosed(id));
        };
        session.in_flight = false;
        match outcome {
            Ok(value) => Ok(on_ok(session, tracker, commits, value)),
            Err(err) => {
                on_err(session, &err);
                Err(err)
            }
        }
    }

    /// Run `body` as the remote phase of a step, inside a span naming the
    /// session and action.
    async fn remote<R, F>(
        &self,
        id: SessionId,
        action: &'static str,
        body: F,
    ) -> Result<R, RevisionError>
    where
        F: Future<Output = Result<R, RevisionError>>,
    {
        let span = debug_span!("remote", session = %id, action);
        let outcome = body.instrument(span).await;
        if let Err(err) = &outcome {
            debug!(session = %id, action, error = %err, "remote call failed");
        }
        outcome
    }

    /// Cached history for (branch, path), fetching it on a miss.
    async fn commits_for(
        &self,
        branch: &BranchName,
        path: &RepoPath,
    ) -> Result<Vec<CommitRecord>, RevisionError> {
        if let Some(cached) = self.cached_commits(branch, path) {
            return Ok(cached);
        }
        let fetched = self.forge.list_commits(&self.repo, branch, path).await?;
        self.lock()
            .commits
            .insert((branch.clone(), path.clone()), fetched.clone());
        Ok(fetched)
    }

    // =========================================================================
    // View / Edit
    // =========================================================================

    /// Fetch the file at the session's branch tip.
    ///
    /// Records the returned token, discards any draft and moves to `Viewing`.
    pub async fn open_file(&self, id: SessionId) -> Result<FileRevision, RevisionError> {
        let (target, ()) = self.begin(
            id,
            "open",
            &[
                SessionState::Unloaded,
                SessionState::Viewing,
                SessionState::Editing,
                SessionState::Conflict,
            ],
            |_, _| Ok(()),
        )?;

        let outcome = self
            .remote(id, "open", async {
                Ok(self
                    .forge
                    .get_file_content(&self.repo, target.branch.as_str(), &target.path)
                    .await?)
            })
            .await;

        self.complete(
            id,
            outcome,
            |session, tracker, _, revision: FileRevision| {
                tracker.set(&target.branch, &target.path, revision.token.clone());
                session.observed = Some(revision.token.clone());
                session.content = Some(revision.content.clone());
                session.draft = None;
                session.state = SessionState::Viewing;
                debug!(session = %id, token = revision.token.short(), "file opened");
                revision
            },
            |_, _| {},
        )
    }

    /// Replace the session's draft. Purely local.
    pub fn edit(&self, id: SessionId, content: impl Into<String>) -> Result<(), RevisionError> {
        let mut shared = self.lock();
        let session = shared
            .sessions
            .get_mut(&id)
            .ok_or(RevisionError::UnknownSession(id))?;
        if session.in_flight {
            return Err(RevisionError::Busy(id));
        }
        match session.state {
            SessionState::Viewing | SessionState::Editing => {
                session.draft = Some(content.into());
                session.state = SessionState::Editing;
                Ok(())
            }
            from => Err(RevisionError::InvalidTransition {
                from,
                action: "edit",
            }),
        }
    }

    /// Commit the draft.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty message (no network call)
    /// - `StaleOrMissingToken` if no token is tracked for the file
    /// - `Conflict` if the tracked token differs from the one this session
    ///   observed, or the backend rejects the token
    pub async fn save_file(
        &self,
        id: SessionId,
        message: &str,
    ) -> Result<ContentToken, RevisionError> {
        let (target, (token, content)) =
            self.begin(id, "save", &[SessionState::Editing], |session, tracker| {
                require_message(message)?;
                let current = tracker.require(&session.branch, &session.path)?;
                if session.observed.as_ref() != Some(&current) {
                    session.state = SessionState::Conflict;
                    return Err(RevisionError::Conflict(format!(
                        "{} was updated by another session",
                        session.path
                    )));
                }
                let content = session.draft.clone().unwrap_or_default();
                session.state = SessionState::Committing;
                Ok((current, content))
            })?;

        let request = PutFileRequest {
            branch: target.branch.clone(),
            path: target.path.clone(),
            token,
            message: message.to_string(),
            content: content.clone(),
        };
        let outcome = self
            .remote(id, "save", async {
                Ok(self.forge.put_file(&self.repo, request).await?)
            })
            .await;

        self.complete(
            id,
            outcome,
            |session, tracker, commits, new_token: ContentToken| {
                tracker.set(&target.branch, &target.path, new_token.clone());
                commits.remove(&(target.branch.clone(), target.path.clone()));
                session.observed = Some(new_token.clone());
                session.content = Some(content);
                session.draft = None;
                session.state = SessionState::Viewing;
                info!(session = %id, branch = %target.branch, path = %target.path, "saved file");
                new_token
            },
            |session, err| {
                session.state = if err.is_conflict() {
                    SessionState::Conflict
                } else {
                    SessionState::Editing
                };
                warn!(session = %id, error = %err, "save failed");
            },
        )
    }

    /// Delete the session's file.
    ///
    /// Same preconditions as [`save_file`](Self::save_file). On success the
    /// tracker entry is dropped and the session returns to `Unloaded`.
    pub async fn delete_file(&self, id: SessionId, message: &str) -> Result<(), RevisionError> {
        let (target, token) = self.begin(
            id,
            "delete",
            &[SessionState::Viewing, SessionState::Editing],
            |session, tracker| {
                require_message(message)?;
                let current = tracker.require(&session.branch, &session.path)?;
                if session.observed.as_ref() != Some(&current) {
                    session.state = SessionState::Conflict;
                    return Err(RevisionError::Conflict(format!(
                        "{} was updated by another session",
                        session.path
                    )));
                }
                Ok(current)
            },
        )?;

        let request = DeleteFileRequest {
            branch: target.branch.clone(),
            path: target.path.clone(),
            token,
            message: message.to_string(),
        };
        let outcome = self
            .remote(id, "delete", async {
                Ok(self.forge.delete_file(&self.repo, request).await?)
            })
            .await;

        self.complete(
            id,
            outcome,
            |session, tracker, commits, ()| {
                tracker.invalidate(&target.branch, &target.path);
                commits.remove(&(target.branch.clone(), target.path.clone()));
                session.unload();
                info!(session = %id, branch = %target.branch, path = %target.path, "deleted file");
            },
            |session, err| {
                if err.is_conflict() {
                    session.state = SessionState::Conflict;
                }
            },
        )
    }

    // =========================================================================
    // History / Diff
    // =========================================================================

    /// Fetch the history of the session's file (newest first) and cache it.
    pub async fn list_commits(&self, id: SessionId) -> Result<Vec<CommitRecord>, RevisionError> {
        let (target, ()) = self.begin(id, "list commits", &ALL_IDLE, |_, _| Ok(()))?;

        let outcome = self
            .remote(id, "list commits", async {
                Ok(self
                    .forge
                    .list_commits(&self.repo, &target.branch, &target.path)
                    .await?)
            })
            .await;

        self.complete(
            id,
            outcome,
            |_, _, commits, fetched: Vec<CommitRecord>| {
                commits.insert(
                    (target.branch.clone(), target.path.clone()),
                    fetched.clone(),
                );
                fetched
            },
            |_, _| {},
        )
    }

    /// Diff the session's file between two references.
    ///
    /// Both references are resolved against the cached history (fetched
    /// on a miss). If either fails to resolve nothing else is fetched.
    ///
    /// # Errors
    ///
    /// `RevisionNotFound` when either reference does not resolve.
    pub async fn view_diff(
        &self,
        id: SessionId,
        old: &str,
        new: &str,
    ) -> Result<DiffView, RevisionError> {
        let (target, ()) = self.begin(id, "view diff", &ALL_IDLE, |_, _| Ok(()))?;

        let outcome = self
            .remote(id, "view diff", async {
                let history = self.commits_for(&target.branch, &target.path).await?;
                let resolve_endpoint = |reference: &str| {
                    resolve(reference, &history).map_err(|_| {
                        RevisionError::RevisionNotFound(format!(
                            "'{}' does not match any commit of {}",
                            RevisionRef::parse(reference),
                            target.path
                        ))
                    })
                };
                let old_id = resolve_endpoint(old)?;
                let new_id = resolve_endpoint(new)?;

                let raw = self
                    .forge
                    .get_diff(&self.repo, &target.path, &old_id, &new_id)
                    .await?;
                let rows = align_text(&raw);
                Ok(DiffView {
                    path: target.path.clone(),
                    old: old_id,
                    new: new_id,
                    stats: DiffStats::from_rows(&rows),
                    rows,
                })
            })
            .await;

        self.complete(id, outcome, |_, _, _, view| view, |_, _| {})
    }

    // =========================================================================
    // Rollback
    // =========================================================================

    /// Restore the session's file to its content at `target` with a new commit.
    ///
    /// On success the tracker holds the token returned by the backend, the
    /// cached history is dropped and the session is `Unloaded`: the file
    /// must be opened again before it can be edited.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty message (no network call)
    /// - `NotFound` if `target` does not resolve
    pub async fn rollback_to(
        &self,
        id: SessionId,
        target_ref: &str,
        message: &str,
    ) -> Result<RollbackOutcome, RevisionError> {
        let (target, ()) = self.begin(
            id,
            "roll back",
            &[
                SessionState::Unloaded,
                SessionState::Viewing,
                SessionState::Conflict,
            ],
            |_, _| require_message(message),
        )?;

        let outcome = self
            .remote(id, "roll back", async {
                let history = self.commits_for(&target.branch, &target.path).await?;
                let commit = resolve(target_ref, &history)?;
                debug!(session = %id, target = commit.short(), "rolling back");
                Ok(self
                    .forge
                    .rollback(
                        &self.repo,
                        RollbackRequest {
                            branch: target.branch.clone(),
                            path: target.path.clone(),
                            target: commit,
                            message: message.to_string(),
                        },
                    )
                    .await?)
            })
            .await;

        self.complete(
            id,
            outcome,
            |session, tracker, commits, rolled: RollbackOutcome| {
                tracker.set(&target.branch, &target.path, rolled.new_token.clone());
                commits.remove(&(target.branch.clone(), target.path.clone()));
                session.unload();
                info!(
                    session = %id,
                    branch = %target.branch,
                    path = %target.path,
                    commit = rolled.new_commit.short(),
                    "rolled back"
                );
                rolled
            },
            |_, _| {},
        )
    }

    // =========================================================================
    // Passthroughs
    // =========================================================================

    /// List a directory on a branch.
    pub async fn list_files(
        &self,
        branch: &BranchName,
        dir: &RepoPath,
    ) -> Result<Vec<FileEntry>, RevisionError> {
        Ok(self.forge.list_files(&self.repo, branch, dir).await?)
    }

    /// Details of one commit. Accepts a full id.
    pub async fn get_commit(&self, id: &CommitId) -> Result<CommitDetail, RevisionError> {
        Ok(self.forge.get_commit(&self.repo, id).await?)
    }

    /// Branches of the repository (cached).
    pub async fn list_branches(&self) -> Result<Vec<Branch>, RevisionError> {
        self.branches.list(&self.repo).await
    }

    /// Create a branch from `from` (default `main`).
    pub async fn create_branch(
        &self,
        name: &str,
        from: Option<&str>,
    ) -> Result<Branch, RevisionError> {
        self.branches.create(&self.repo, name, from).await
    }

    /// Delete a branch and forget every token and history cached for it.
    pub async fn delete_branch(&self, name: &str) -> Result<BranchDeleted, RevisionError> {
        let deleted = self.branches.delete(&self.repo, name).await?;
        let mut shared = self.lock();
        shared.tracker.invalidate_branch(&deleted.deleted);
        shared.commits.retain(|(b, _), _| *b != deleted.deleted);
        Ok(deleted)
    }
}

/// Every state in which no call is outstanding.
const ALL_IDLE: [SessionState; 4] = [
    SessionState::Unloaded,
    SessionState::Viewing,
    SessionState::Editing,
    SessionState::Conflict,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{content_token, FailOn, MockForge};
    use crate::forge::ForgeError;

    fn setup(content: &str) -> (MockForge, Orchestrator, RepoPath) {
        let forge = MockForge::new();
        let path = RepoPath::new("gateway/routes.yaml").unwrap();
        forge.seed_file(&BranchName::main(), &path, content, "seed");
        let orch = Orchestrator::new(
            Arc::new(forge.clone()),
            RepoId::parse("acme/config").unwrap(),
        );
        (forge, orch, path)
    }

    #[tokio::test]
    async fn open_sets_token_and_viewing() {
        let (_forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path.clone());

        let rev = orch.open_file(s).await.unwrap();
        assert_eq!(rev.content, "a\n");
        assert_eq!(orch.session(s).unwrap().state, SessionState::Viewing);
        assert_eq!(
            orch.current_token(&BranchName::main(), &path),
            Some(content_token("a\n"))
        );
    }

    #[tokio::test]
    async fn save_requires_editing() {
        let (_forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path);
        orch.open_file(s).await.unwrap();

        assert!(matches!(
            orch.save_file(s, "msg").await,
            Err(RevisionError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn empty_message_rejected_before_network() {
        let (forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path);
        orch.open_file(s).await.unwrap();
        orch.edit(s, "b\n").unwrap();
        forge.clear_operations();

        assert!(matches!(
            orch.save_file(s, "   ").await,
            Err(RevisionError::Validation(_))
        ));
        assert!(forge.operations().is_empty());
        assert_eq!(orch.session(s).unwrap().state, SessionState::Editing);
    }

    #[tokio::test]
    async fn save_refreshes_token() {
        let (forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path.clone());
        orch.open_file(s).await.unwrap();
        orch.edit(s, "b\n").unwrap();

        let token = orch.save_file(s, "update").await.unwrap();
        assert_eq!(token, content_token("b\n"));
        assert_eq!(orch.current_token(&BranchName::main(), &path), Some(token));
        let info = orch.session(s).unwrap();
        assert_eq!(info.state, SessionState::Viewing);
        assert_eq!(info.content.as_deref(), Some("b\n"));
        assert_eq!(forge.file_content(&BranchName::main(), &path).as_deref(), Some("b\n"));
    }

    #[tokio::test]
    async fn backend_conflict_leaves_tracker() {
        let (forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path.clone());
        orch.open_file(s).await.unwrap();
        orch.edit(s, "b\n").unwrap();
        forge.seed_file(&BranchName::main(), &path, "other\n", "remote edit");

        let result = orch.save_file(s, "update").await;
        assert!(matches!(result, Err(RevisionError::Conflict(_))));
        assert_eq!(
            orch.current_token(&BranchName::main(), &path),
            Some(content_token("a\n"))
        );
        assert_eq!(orch.session(s).unwrap().state, SessionState::Conflict);
    }

    #[tokio::test]
    async fn network_failure_returns_to_editing() {
        let (forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path);
        orch.open_file(s).await.unwrap();
        orch.edit(s, "b\n").unwrap();
        let forge = forge.fail_on(FailOn::PutFile(ForgeError::NetworkError("reset".into())));

        assert!(matches!(
            orch.save_file(s, "update").await,
            Err(RevisionError::Network(_))
        ));
        let info = orch.session(s).unwrap();
        assert_eq!(info.state, SessionState::Editing);
        assert_eq!(info.draft.as_deref(), Some("b\n"));
        assert!(!info.in_flight);
        drop(forge);
    }

    #[tokio::test]
    async fn failed_history_fetch_can_be_retried() {
        let (forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path);
        let forge = forge.fail_on(FailOn::ListCommits(ForgeError::NetworkError("reset".into())));

        assert!(matches!(
            orch.list_commits(s).await,
            Err(RevisionError::Network(_))
        ));
        assert!(!orch.session(s).unwrap().in_flight);

        forge.clear_fail_on();
        let commits = orch.list_commits(s).await.unwrap();
        assert_eq!(commits.len(), 1);
    }

    #[tokio::test]
    async fn edit_before_open_is_invalid() {
        let (_forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path);
        assert!(matches!(
            orch.edit(s, "x"),
            Err(RevisionError::InvalidTransition {
                from: SessionState::Unloaded,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn unknown_session() {
        let (_forge, orch, _path) = setup("a\n");
        let ghost = SessionId::new();
        assert!(matches!(
            orch.open_file(ghost).await,
            Err(RevisionError::UnknownSession(_))
        ));
        assert!(orch.close_session(ghost).is_err());
    }

    #[tokio::test]
    async fn delete_file_unloads_session() {
        let (forge, orch, path) = setup("a\n");
        let s = orch.open_session(BranchName::main(), path.clone());
        orch.open_file(s).await.unwrap();

        orch.delete_file(s, "remove routes").await.unwrap();
        assert_eq!(orch.session(s).unwrap().state, SessionState::Unloaded);
        assert!(orch.current_token(&BranchName::main(), &path).is_none());
        assert!(forge.file_content(&BranchName::main(), &path).is_none());
    }

    #[tokio::test]
    async fn resolve_uses_cached_history() {
        let (forge, orch, path) = setup("a\n");
        let second = forge.seed_file(&BranchName::main(), &path, "b\n", "two");
        let s = orch.open_session(BranchName::main(), path);

        assert!(orch.resolve(s, "latest").is_err());
        orch.list_commits(s).await.unwrap();
        assert_eq!(orch.resolve(s, "latest").unwrap(), second);
        assert_eq!(orch.resolve(s, second.short()).unwrap(), second);
    }

    #[tokio::test]
    async fn delete_branch_forgets_tokens() {
        let (forge, orch, path) = setup("a\n");
        let feature = BranchName::new("feature").unwrap();
        forge.seed_branch(&feature, &BranchName::main());

        let s = orch.open_session(feature.clone(), path.clone());
        orch.open_file(s).await.unwrap();
        assert!(orch.current_token(&feature, &path).is_some());

        let deleted = orch.delete_branch("feature").await.unwrap();
        assert_eq!(deleted.redirect_to, BranchName::main());
        assert!(orch.current_token(&feature, &path).is_none());
    }
}
