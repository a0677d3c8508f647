//! cli::commands::auth
//!
//! Authentication command for storing a personal access token.
//!
//! # Design
//!
//! - Tokens are stored via the configured SecretStore under `<host>.token`
//! - Tokens are NEVER printed to stdout/stderr
//! - `CONFREV_TOKEN` overrides the stored token at runtime
//!
//! # Example
//!
//! ```bash
//! # Interactive (prompts for token)
//! confrev auth
//!
//! # Non-interactive
//! confrev auth --token ghp_xxxx
//!
//! # Check status
//! confrev auth --status
//!
//! # Remove stored token
//! confrev auth --logout
//! ```

use crate::auth::{host_for_api_base, StoredTokenProvider, TokenProvider, TOKEN_ENV};
use crate::cli::Context;
use crate::secrets;
use crate::ui::{output, prompts};
use anyhow::{bail, Context as _, Result};

/// Run the auth command.
///
/// The host is derived from the configured `api_base`.
pub fn auth(ctx: &Context, token: Option<&str>, status: bool, logout: bool) -> Result<()> {
    let host = host_for_api_base(ctx.config.api_base());
    let store = secrets::create_store(ctx.config.secrets_provider())
        .context("Failed to initialize secret store")?;
    let provider = StoredTokenProvider::new(&host, store);

    if status {
        return show_status(ctx, &provider);
    }

    if logout {
        provider.logout().context("Failed to remove stored token")?;
        output::success(format!("Logged out from {}.", host), ctx.verbosity());
        return Ok(());
    }

    let value = match token {
        Some(t) => t.to_string(),
        None => {
            if !ctx.interactive {
                bail!("Token required. Use --token <TOKEN> or run interactively.");
            }
            prompts::password(&format!("Personal access token for {}", host), true)?
        }
    };

    provider
        .store_token(&value)
        .context("Failed to store token")?;
    output::success(
        format!("Authentication configured for {}.", host),
        ctx.verbosity(),
    );
    Ok(())
}

/// Show authentication status without revealing the token.
fn show_status(ctx: &Context, provider: &StoredTokenProvider) -> Result<()> {
    let from_env = std::env::var(TOKEN_ENV).is_ok_and(|t| !t.trim().is_empty());
    let stored = provider.is_authenticated();

    if ctx.quiet {
        // Machine-readable output
        if stored || from_env {
            println!("authenticated");
        } else {
            println!("not_authenticated");
        }
        return Ok(());
    }

    if from_env {
        println!("Using token from {}.", TOKEN_ENV);
    }
    if stored {
        println!("Authenticated with {}.", provider.host());
    } else if !from_env {
        println!("Not authenticated with {}.", provider.host());
        println!("Run 'confrev auth' to authenticate.");
    }
    Ok(())
}
