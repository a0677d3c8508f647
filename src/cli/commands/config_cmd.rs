//! config command - Get, set, or list configuration values
//!
//! Global keys are written to the loaded global file (or the canonical
//! location), repo keys to `.git/confrev/config.toml` of the enclosing
//! checkout.

use crate::cli::Context;
use crate::core::config::{Config, ConfigScope};
use crate::ui::output;
use anyhow::{anyhow, Context as _, Result};

fn scope_of(key: &str) -> Result<ConfigScope> {
    ConfigScope::for_key(key).ok_or_else(|| anyhow!("Unknown configuration key: {}", key))
}

/// Print the effective value of a key. Prints nothing if it is unset.
pub fn get(ctx: &Context, key: &str) -> Result<()> {
    scope_of(key)?;
    if let Some((_, value)) = ctx.config.list().into_iter().find(|(k, _)| *k == key) {
        output::result(value);
    }
    Ok(())
}

/// Set a configuration value.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let path = match scope_of(key)? {
        ConfigScope::Global => {
            let mut global = ctx.config.global.clone();
            global.set_key(key, value)?;
            let path = match ctx.config.global_config_loaded_from() {
                Some(p) => p.to_path_buf(),
                None => Config::global_config_path()?,
            };
            Config::write_global_to(&path, &global).context("Failed to write config")?;
            path
        }
        ConfigScope::Repo => {
            let root = ctx
                .checkout_root
                .as_deref()
                .ok_or_else(|| anyhow!("'{}' is a repository setting; run inside a git checkout.", key))?;
            let mut repo = ctx.config.repo.clone().unwrap_or_default();
            repo.set_key(key, value)?;
            Config::write_repo(root, &repo).context("Failed to write config")?
        }
    };

    output::success(format!("Set {} = {}", key, value), ctx.verbosity());
    output::debug(format!("wrote {}", path.display()), ctx.verbosity());
    Ok(())
}

/// List effective configuration values.
pub fn list(ctx: &Context) -> Result<()> {
    for (key, value) in ctx.config.list() {
        output::result(format!("{} = {}", key, value));
    }
    if let Some(path) = ctx.config.global_config_loaded_from() {
        output::debug(format!("global config: {}", path.display()), ctx.verbosity());
    }
    if let Some(path) = ctx.config.repo_config_loaded_from() {
        output::debug(format!("repo config: {}", path.display()), ctx.verbosity());
    }
    Ok(())
}
