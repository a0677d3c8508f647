//! revision::session
//!
//! Identity and lifecycle states of a file-editing session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{BranchName, ContentToken, RepoPath};

/// Identifier of a file-editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a session is in the View/Edit/Commit cycle.
///
/// ```text
/// Unloaded → Viewing → Editing → Committing → Viewing
///                                          ↘ Conflict
///                                          ↘ Editing (save failed)
/// ```
///
/// A successful rollback or file deletion returns the session to
/// `Unloaded`; the file must be opened again before it can be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No content loaded (new session, or after rollback/delete).
    Unloaded,
    /// Content loaded, no pending edits.
    Viewing,
    /// A draft is held in memory.
    Editing,
    /// A save is in flight.
    Committing,
    /// The last save was rejected because the file moved on remotely.
    Conflict,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionState::Unloaded => "unloaded",
            SessionState::Viewing => "viewing",
            SessionState::Editing => "editing",
            SessionState::Committing => "committing",
            SessionState::Conflict => "conflict",
        };
        write!(f, "{}", s)
    }
}

/// Read-only snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub branch: BranchName,
    pub path: RepoPath,
    pub state: SessionState,
    /// Token observed by this session's last successful fetch or save
    pub observed_token: Option<ContentToken>,
    /// Last loaded or saved content
    pub content: Option<String>,
    /// Unsaved draft
    pub draft: Option<String>,
    /// Whether a remote call is outstanding
    pub in_flight: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn id_displays_as_uuid() {
        let id = SessionId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Committing.to_string(), "committing");
        assert_eq!(SessionState::Conflict.to_string(), "conflict");
    }
}
