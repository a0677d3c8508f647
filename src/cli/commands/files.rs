//! files and show commands - Browse the repository at a branch tip

use super::remote::{block_on, connect, parse_path};
use crate::cli::Context;
use crate::core::types::RepoPath;
use crate::ui::{output, render};
use anyhow::Result;

/// List a directory.
pub fn files(ctx: &Context, dir: Option<&str>) -> Result<()> {
    let remote = connect(ctx)?;
    let dir = match dir {
        Some(d) if !d.trim_matches('/').is_empty() => parse_path(d.trim_matches('/'))?,
        _ => RepoPath::root(),
    };

    let entries = block_on(remote.orchestrator.list_files(&remote.branch, &dir))?;
    if entries.is_empty() {
        output::print(
            format!("{} is empty on {}.", dir, remote.branch),
            ctx.verbosity(),
        );
    } else {
        output::result(render::file_listing(&entries));
    }
    Ok(())
}

/// Print a file's content.
pub fn show(ctx: &Context, path: &str) -> Result<()> {
    let remote = connect(ctx)?;
    let (session, _) = remote.session(path)?;

    let revision = block_on(remote.orchestrator.open_file(session))?;
    output::debug(
        format!("content token {}", revision.token.short()),
        ctx.verbosity(),
    );
    print!("{}", revision.content);
    if !revision.content.is_empty() && !revision.content.ends_with('\n') {
        println!();
    }
    Ok(())
}
