//! rollback command - Restore a file to an earlier commit
//!
//! Forward-only: the restored content lands as a new commit at the
//! branch tip.

use super::remote::{block_on, confirm, connect};
use crate::cli::Context;
use crate::ui::output;
use anyhow::Result;

/// Roll `path` back to its content at `target`.
pub fn rollback(ctx: &Context, path: &str, target: &str, message: &str) -> Result<()> {
    let remote = connect(ctx)?;
    let (session, path) = remote.session(path)?;
    confirm(
        ctx,
        &format!("Roll back {} on {} to {}?", path, remote.branch, target),
    )?;

    let outcome = block_on(remote.orchestrator.rollback_to(session, target, message))?;
    output::success(
        format!(
            "Rolled back {} to {}. New commit {}.",
            path,
            target,
            outcome.new_commit.short()
        ),
        ctx.verbosity(),
    );
    Ok(())
}
