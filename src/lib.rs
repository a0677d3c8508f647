//! confrev - revision control for configuration files on a hosted repository
//!
//! confrev views, edits, diffs and rolls back text configuration files kept
//! in a repository on a hosting service, and manages its branches. Every
//! change is a commit made through the service's API; nothing is cloned.
//!
//! # Architecture
//!
//! - [`revision`] - Workflow orchestration, reference resolution, token
//!   tracking, diff alignment and branch lifecycle
//! - [`forge`] - Abstraction for the hosting service (GitHub adapter, in-memory mock)
//! - [`core`] - Domain types and configuration
//! - [`auth`] - Bearer-token provision
//! - [`secrets`] - Secret storage abstraction
//! - [`git`] - Local checkout discovery
//! - [`ui`] - Output, prompts and rendering
//! - [`cli`] - Command-line interface layer
//!
//! # Correctness Invariants
//!
//! 1. Every mutation carries the content token from the latest successful
//!    fetch or mutation of the same (branch, path)
//! 2. A failed mutation never changes tracked tokens
//! 3. Mutations are never retried automatically
//! 4. `main` is never deleted

pub mod auth;
pub mod cli;
pub mod core;
pub mod forge;
pub mod git;
pub mod revision;
pub mod secrets;
pub mod ui;
