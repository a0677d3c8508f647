//! forge
//!
//! Abstraction for the remote hosting service that stores the
//! configuration repository.
//!
//! # Architecture
//!
//! The `Forge` trait defines the interface for the backend. Commands use
//! the [`create_forge`] factory function rather than importing specific
//! forge implementations directly.
//!
//! - The backend owns the commit graph, diffs and rollback execution
//! - Forge failures are surfaced, never retried for mutations
//! - Content tokens returned here feed the revision token tracker
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: In-memory implementation for deterministic testing
//! - `factory`: Forge selection and creation

mod factory;
pub mod github;
pub mod mock;
mod traits;

pub use factory::{create_forge, detect_repo, ForgeProvider};
pub use traits::*;
