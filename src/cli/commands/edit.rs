//! edit and rm commands - Token-checked file mutations
//!
//! Both fetch the file first so the mutation carries the content token
//! of the version being replaced. A concurrent commit in between makes
//! the backend reject the mutation with a conflict.

use std::io::Read;
use std::path::Path;

use super::remote::{block_on, confirm, connect};
use crate::cli::Context;
use crate::ui::{output, render};
use anyhow::{Context as _, Result};

fn read_content(from_file: Option<&Path>) -> Result<String> {
    match from_file {
        Some(file) => std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read '{}'", file.display())),
        None => {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read content from stdin")?;
            Ok(content)
        }
    }
}

/// Replace a file's content and commit it.
pub fn edit(ctx: &Context, path: &str, from_file: Option<&Path>, message: &str) -> Result<()> {
    let content = read_content(from_file)?;
    let remote = connect(ctx)?;
    let (session, path) = remote.session(path)?;
    let orch = &remote.orchestrator;

    let saved = block_on(async {
        let current = orch.open_file(session).await?;
        if current.content == content {
            return Ok(None);
        }
        orch.edit(session, content)?;
        orch.save_file(session, message).await.map(Some)
    })?;

    match saved {
        None => output::print(render::NO_CHANGES, ctx.verbosity()),
        Some(token) => output::success(
            format!(
                "Committed {} on {} (token {}).",
                path,
                remote.branch,
                token.short()
            ),
            ctx.verbosity(),
        ),
    }
    Ok(())
}

/// Delete a file.
pub fn rm(ctx: &Context, path: &str, message: &str) -> Result<()> {
    let remote = connect(ctx)?;
    let (session, path) = remote.session(path)?;
    confirm(ctx, &format!("Delete {} on {}?", path, remote.branch))?;

    let orch = &remote.orchestrator;
    block_on(async {
        orch.open_file(session).await?;
        orch.delete_file(session, message).await
    })?;

    output::success(
        format!("Deleted {} on {}.", path, remote.branch),
        ctx.verbosity(),
    );
    Ok(())
}
