//! cli
//!
//! Command-line interface layer for confrev.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and install the tracing subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. Handlers build an [`Orchestrator`](crate::revision::Orchestrator)
//! for the target repository and drive one workflow step per invocation.
//! Every revision rule (tokens, validation, protection of `main`) is
//! enforced below this layer.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::{Config, ConfigWarning};
use crate::git::Checkout;
use crate::ui::output::{self, Verbosity};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "CONFREV_LOG";

/// Per-invocation state shared by command handlers.
#[derive(Debug)]
pub struct Context {
    /// Working directory (from `--cwd` or the process)
    pub cwd: PathBuf,
    /// Root of the enclosing local checkout, if any
    pub checkout_root: Option<PathBuf>,
    /// Merged configuration
    pub config: Config,
    /// `--repo` override
    pub repo: Option<String>,
    /// `--branch` override
    pub branch: Option<String>,
    pub debug: bool,
    pub quiet: bool,
    pub interactive: bool,
    /// `--yes`: skip confirmations
    pub yes: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Install the stderr subscriber.
///
/// `CONFREV_LOG` wins; otherwise `--debug` selects `debug` and the
/// configured level applies.
fn init_tracing(debug: bool, configured: &str) {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directive) if !directive.is_empty() => EnvFilter::new(directive),
        _ if debug => EnvFilter::new("debug"),
        _ => EnvFilter::new(configured),
    };
    // A second init (in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn report_warnings(warnings: &[ConfigWarning], verbosity: Verbosity) {
    for w in warnings {
        output::warn(format!("{} ({})", w.message, w.path.display()), verbosity);
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let cwd = match cli.cwd.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let checkout_root = Checkout::open(&cwd).ok().map(|c| c.root().to_path_buf());

    let loaded = Config::load(checkout_root.as_deref()).context("Failed to load configuration")?;
    init_tracing(cli.debug, loaded.config.log_level());

    let ctx = Context {
        interactive: cli.interactive() && loaded.config.interactive(),
        cwd,
        checkout_root,
        config: loaded.config,
        repo: cli.repo.clone(),
        branch: cli.branch.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
        yes: cli.yes,
    };
    report_warnings(&loaded.warnings, ctx.verbosity());
    tracing::debug!(cwd = %ctx.cwd.display(), checkout = ?ctx.checkout_root, "context ready");

    commands::dispatch(cli.command, &ctx)
}
