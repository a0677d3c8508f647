//! Revision workflows: view/edit, history/diff, rollback and branches.
//!
//! [`Orchestrator`] is the entry point. The other modules are the pieces it
//! is built from and are usable on their own:
//!
//! - [`resolve`] maps `latest` or a short id to a full commit id
//! - [`TokenTracker`] holds the last observed content token per file
//! - [`align`] pairs unified-diff lines into side-by-side rows
//! - [`BranchManager`] validates and performs branch create/delete

mod branches;
mod diff;
mod errors;
mod orchestrator;
mod resolver;
mod session;
mod tokens;

pub use branches::{parse_branch_name, BranchDeleted, BranchManager};
pub use diff::{align, align_text, DiffRow, DiffRowKind, DiffStats};
pub use errors::RevisionError;
pub use orchestrator::{DiffView, Orchestrator};
pub use resolver::{resolve, RevisionRef, LATEST};
pub use session::{SessionId, SessionInfo, SessionState};
pub use tokens::TokenTracker;
