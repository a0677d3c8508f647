//! log and commit commands - File history and commit details

use super::remote::{block_on, connect};
use crate::cli::Context;
use crate::core::types::CommitId;
use crate::ui::{output, render};
use anyhow::{Context as _, Result};

/// Show a file's history, newest first.
pub fn log(ctx: &Context, path: &str, limit: Option<usize>) -> Result<()> {
    let remote = connect(ctx)?;
    let (session, path) = remote.session(path)?;

    let mut commits = block_on(remote.orchestrator.list_commits(session))?;
    if let Some(n) = limit {
        commits.truncate(n);
    }

    if commits.is_empty() {
        output::print(
            format!("No history for {} on {}.", path, remote.branch),
            ctx.verbosity(),
        );
    } else {
        output::result(render::commit_log(&commits));
    }
    Ok(())
}

/// Show one commit.
///
/// With `path`, `id` may be a short id or `latest`, resolved against that
/// file's history; otherwise it must be a full id.
pub fn commit(ctx: &Context, id: &str, path: Option<&str>) -> Result<()> {
    let remote = connect(ctx)?;
    let orch = &remote.orchestrator;

    let detail = match path {
        Some(path) => {
            let (session, _) = remote.session(path)?;
            block_on(async {
                orch.list_commits(session).await?;
                let full = orch.resolve(session, id)?;
                orch.get_commit(&full).await
            })?
        }
        None => {
            let full = CommitId::new(id).with_context(|| format!("Invalid commit id '{}'", id))?;
            block_on(orch.get_commit(&full))?
        }
    };

    output::result(render::commit_detail(&detail));
    Ok(())
}
