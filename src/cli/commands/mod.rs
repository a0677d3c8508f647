//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Connects to the hosted repository through [`remote::connect`]
//! 3. Drives the orchestrator and formats the result
//!
//! # Async Commands
//!
//! Forge calls are async. Handlers stay synchronous and run their async
//! part to completion on a fresh tokio runtime via [`remote::block_on`].

mod auth;
mod branch;
mod completion;
mod config_cmd;
mod diff;
mod edit;
mod files;
mod log_cmd;
mod remote;
mod rollback;

pub use auth::auth;
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};

use crate::cli::args::{BranchAction, Command, ConfigAction};
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        // Viewing
        Command::Files { dir } => files::files(ctx, dir.as_deref()),
        Command::Show { path } => files::show(ctx, &path),
        Command::Log { path, limit } => log_cmd::log(ctx, &path, limit),
        Command::Commit { id, path } => log_cmd::commit(ctx, &id, path.as_deref()),
        Command::Diff {
            path,
            old,
            new,
            width,
        } => diff::diff(ctx, &path, &old, &new, width),

        // Mutations
        Command::Edit {
            path,
            from_file,
            message,
        } => edit::edit(ctx, &path, from_file.as_deref(), &message),
        Command::Rm { path, message } => edit::rm(ctx, &path, &message),
        Command::Rollback {
            path,
            target,
            message,
        } => rollback::rollback(ctx, &path, &target, &message),
        Command::Branch { action } => match action {
            BranchAction::List => branch::list(ctx),
            BranchAction::Create { name, from } => branch::create(ctx, &name, &from),
            BranchAction::Delete { name } => branch::delete(ctx, &name),
        },

        // Setup
        Command::Auth {
            token,
            status,
            logout,
        } => auth::auth(ctx, token.as_deref(), status, logout),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}
