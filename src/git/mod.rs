//! git
//!
//! Local checkout discovery.
//!
//! confrev never reads or writes history locally; every revision operation
//! goes to the hosting service. A local checkout is only used to find
//! where the repo config lives and which hosted repository its remote
//! points at. No other module imports `git2`.
//!
//! # Example
//!
//! ```no_run
//! use confrev::git::Checkout;
//! use std::path::Path;
//!
//! let checkout = Checkout::open(Path::new("."))?;
//! if let Some(repo) = checkout.hosted_repo("origin")? {
//!     println!("{} is a checkout of {}", checkout.root().display(), repo);
//! }
//! # Ok::<(), confrev::git::GitError>(())
//! ```

mod checkout;

pub use checkout::{Checkout, GitError};
