//! diff command - Side-by-side diff of a file between two commits

use super::remote::{block_on, connect};
use crate::cli::Context;
use crate::ui::{output, render};
use anyhow::Result;

/// Show the aligned diff of `path` between `old` and `new`.
pub fn diff(ctx: &Context, path: &str, old: &str, new: &str, width: usize) -> Result<()> {
    let remote = connect(ctx)?;
    let (session, _) = remote.session(path)?;

    let view = block_on(remote.orchestrator.view_diff(session, old, new))?;
    output::result(render::side_by_side(&view, width));
    Ok(())
}
