//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Confirmations and masked input
//! - [`output`] - Verbosity-aware output
//! - [`render`] - Tables and side-by-side diffs
//!
//! # Design
//!
//! All output and prompts go through this module so that quiet and
//! non-interactive modes behave the same in every command.

pub mod output;
pub mod prompts;
pub mod render;
