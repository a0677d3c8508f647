//! cli::commands::remote
//!
//! Shared plumbing for commands that talk to the hosted repository.

use std::future::Future;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use tracing::debug;

use crate::auth::{host_for_api_base, provider_for_host};
use crate::cli::Context;
use crate::core::types::{BranchName, RepoId, RepoPath};
use crate::forge::{create_forge, ForgeProvider};
use crate::git::Checkout;
use crate::revision::{parse_branch_name, Orchestrator, RevisionError, SessionId};
use crate::secrets;
use crate::ui::prompts::{self, PromptError};

/// A connected repository and the branch this invocation works on.
pub struct Remote {
    pub orchestrator: Orchestrator,
    pub branch: BranchName,
}

impl Remote {
    /// Open a session on `path` in the working branch.
    pub fn session(&self, path: &str) -> Result<(SessionId, RepoPath)> {
        let path = parse_path(path)?;
        let id = self
            .orchestrator
            .open_session(self.branch.clone(), path.clone());
        Ok((id, path))
    }
}

pub fn parse_path(path: &str) -> Result<RepoPath> {
    RepoPath::new(path).with_context(|| format!("Invalid path '{}'", path))
}

/// Hosted repository for this invocation.
///
/// `--repo` wins, then `forge_repo` from the repo config, then the URL of
/// the configured remote of the enclosing checkout.
pub fn resolve_repo(ctx: &Context) -> Result<RepoId> {
    if let Some(spec) = &ctx.repo {
        return RepoId::parse(spec).with_context(|| format!("Invalid --repo '{}'", spec));
    }
    if let Some(repo) = ctx.config.forge_repo() {
        return Ok(repo);
    }
    if let Ok(checkout) = Checkout::open(&ctx.cwd) {
        if let Some(repo) = checkout.hosted_repo(ctx.config.remote())? {
            debug!(%repo, "repository from remote URL");
            return Ok(repo);
        }
    }
    bail!(
        "Cannot determine the repository. Pass --repo owner/name, \
         or run 'confrev config set forge_repo.owner <owner>' and \
         'confrev config set forge_repo.repo <name>' inside a checkout."
    )
}

/// Working branch: `--branch`, then config, then `main`.
pub fn resolve_branch(ctx: &Context) -> Result<BranchName> {
    match &ctx.branch {
        Some(name) => Ok(parse_branch_name(name)?),
        None => Ok(ctx.config.branch()),
    }
}

/// Build the orchestrator for this invocation.
pub fn connect(ctx: &Context) -> Result<Remote> {
    let repo = resolve_repo(ctx)?;
    let branch = resolve_branch(ctx)?;

    let api_base = ctx.config.api_base();
    let host = host_for_api_base(api_base);
    let store = secrets::create_store(ctx.config.secrets_provider())
        .context("Failed to initialize secret store")?;
    let provider = provider_for_host(&host, store);
    if !provider.is_authenticated() {
        bail!(
            "Not authenticated with {}. Run 'confrev auth' or set {}.",
            host,
            crate::auth::TOKEN_ENV
        );
    }

    let forge = create_forge(ForgeProvider::GitHub, Arc::clone(&provider), Some(api_base))
        .context("Failed to create forge client")?;
    debug!(%repo, %branch, api_base, "connected");

    Ok(Remote {
        orchestrator: Orchestrator::new(forge, repo),
        branch,
    })
}

/// Run an async workflow step to completion.
pub fn block_on<T>(future: impl Future<Output = Result<T, RevisionError>>) -> Result<T> {
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    Ok(rt.block_on(future)?)
}

/// Ask before a destructive step. `--yes` skips the prompt.
pub fn confirm(ctx: &Context, question: &str) -> Result<()> {
    if ctx.yes {
        return Ok(());
    }
    match prompts::confirm(question, false, ctx.interactive) {
        Ok(true) => Ok(()),
        Ok(false) | Err(PromptError::Cancelled) => bail!("Aborted."),
        Err(PromptError::NotInteractive) => {
            bail!("Confirmation required. Re-run with --yes to proceed.")
        }
        Err(e) => Err(e.into()),
    }
}
