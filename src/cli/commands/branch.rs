//! branch command - List, create, and delete branches

use super::remote::{block_on, confirm, connect};
use crate::cli::Context;
use crate::ui::{output, render};
use anyhow::Result;

/// List branches, marking the working branch.
pub fn list(ctx: &Context) -> Result<()> {
    let remote = connect(ctx)?;
    let branches = block_on(remote.orchestrator.list_branches())?;
    output::result(render::branch_list(&branches, &remote.branch));
    Ok(())
}

/// Create `name` from `from`.
pub fn create(ctx: &Context, name: &str, from: &str) -> Result<()> {
    let remote = connect(ctx)?;
    let branch = block_on(remote.orchestrator.create_branch(name, Some(from)))?;
    output::success(
        format!("Created branch {} from {}.", branch.name, from),
        ctx.verbosity(),
    );
    Ok(())
}

/// Delete `name`. `main` is refused before anything is sent.
pub fn delete(ctx: &Context, name: &str) -> Result<()> {
    let remote = connect(ctx)?;
    confirm(ctx, &format!("Delete branch {}?", name))?;

    let deleted = block_on(remote.orchestrator.delete_branch(name))?;
    output::success(format!("Deleted branch {}.", deleted.deleted), ctx.verbosity());
    if remote.branch == deleted.deleted {
        output::print(
            format!("Switch to {} with --branch {}.", deleted.redirect_to, deleted.redirect_to),
            ctx.verbosity(),
        );
    }
    Ok(())
}
