//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--repo <owner/name>`: Hosted repository to work on
//! - `--branch <name>`: Branch to work on
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--yes` / `-y`: Skip confirmation prompts

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

/// confrev - revision control for configuration files on a hosted repository
#[derive(Parser, Debug)]
#[command(name = "confrev")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if confrev was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Hosted repository as owner/name (default: from config or the origin remote)
    #[arg(long, global = true, value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Branch to work on (default: from config, then main)
    #[arg(short, long, global = true)]
    pub branch: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; disables prompts
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive prompts may be shown.
    ///
    /// False under `--quiet` or when stdin is not a terminal.
    pub fn interactive(&self) -> bool {
        !self.quiet && std::io::stdin().is_terminal()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List files in a directory
    #[command(
        name = "files",
        after_help = "\
EXAMPLES:
    confrev files
    confrev files envs/prod --branch staging"
    )]
    Files {
        /// Directory to list (default: repository root)
        dir: Option<String>,
    },

    /// Print a file at the branch tip
    #[command(name = "show")]
    Show {
        /// Path of the file
        path: String,
    },

    /// Replace a file's content and commit it
    #[command(
        name = "edit",
        long_about = "Replace a file's content and commit it.\n\n\
            The file is fetched first so the commit carries the content token of \
            the version you replaced. If someone else committed in between, the \
            commit is rejected with a conflict and nothing is written.",
        after_help = "\
EXAMPLES:
    confrev edit limits.yaml --from-file ./limits.yaml -m \"Raise rps limit\"
    render-config | confrev edit app.toml -m \"Regenerate\""
    )]
    Edit {
        /// Path of the file
        path: String,

        /// Read new content from this file (default: stdin)
        #[arg(long, value_name = "FILE")]
        from_file: Option<PathBuf>,

        /// Commit message
        #[arg(short, long, required = true, value_parser = commit_message)]
        message: String,
    },

    /// Delete a file
    #[command(name = "rm")]
    Rm {
        /// Path of the file
        path: String,

        /// Commit message
        #[arg(short, long, required = true, value_parser = commit_message)]
        message: String,
    },

    /// Show the commit history of a file
    #[command(name = "log")]
    Log {
        /// Path of the file
        path: String,

        /// Show at most this many commits
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show one commit
    #[command(name = "commit")]
    Commit {
        /// Commit id (a short id needs --path to resolve)
        id: String,

        /// Resolve a short id against this file's history
        #[arg(long)]
        path: Option<String>,
    },

    /// Side-by-side diff of a file between two commits
    #[command(
        name = "diff",
        after_help = "\
EXAMPLES:
    # Compare an older commit with the newest one
    confrev diff limits.yaml abc123

    # Compare two commits by short id
    confrev diff limits.yaml abc123 def456"
    )]
    Diff {
        /// Path of the file
        path: String,

        /// Older commit (short id or 'latest')
        old: String,

        /// Newer commit (short id or 'latest')
        #[arg(default_value = "latest")]
        new: String,

        /// Total output width
        #[arg(long, default_value_t = crate::ui::render::DEFAULT_WIDTH)]
        width: usize,
    },

    /// Restore a file to its content at an earlier commit
    #[command(
        name = "rollback",
        long_about = "Restore a file to its content at an earlier commit.\n\n\
            Rollback is forward-only: it creates a new commit at the branch tip \
            whose content equals the target commit's. History is never rewritten."
    )]
    Rollback {
        /// Path of the file
        path: String,

        /// Commit to restore (short id or 'latest')
        target: String,

        /// Commit message
        #[arg(short, long, required = true, value_parser = commit_message)]
        message: String,
    },

    /// List, create, or delete branches
    #[command(name = "branch")]
    Branch {
        #[command(subcommand)]
        action: BranchAction,
    },

    /// Configure authentication
    #[command(
        name = "auth",
        after_help = "\
EXAMPLES:
    confrev auth                # prompts for a personal access token
    confrev auth --token ghp_x  # non-interactive
    confrev auth --status
    confrev auth --logout"
    )]
    Auth {
        /// Personal access token (prompted for when omitted)
        #[arg(long)]
        token: Option<String>,

        /// Show authentication status
        #[arg(long, conflicts_with_all = ["token", "logout"])]
        status: bool,

        /// Remove the stored token
        #[arg(long, conflicts_with = "token")]
        logout: bool,
    },

    /// Get, set, or list configuration values
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    confrev completion bash > ~/.local/share/bash-completion/completions/confrev

    # Zsh
    confrev completion zsh > ~/.zfunc/_confrev

    # Fish
    confrev completion fish > ~/.config/fish/completions/confrev.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Branch subcommands.
#[derive(Subcommand, Debug)]
pub enum BranchAction {
    /// List branches
    List,

    /// Create a branch
    Create {
        /// Name of the new branch
        name: String,

        /// Branch to start from
        #[arg(long, default_value = "main")]
        from: String,
    },

    /// Delete a branch (main is protected)
    Delete {
        /// Branch to delete
        name: String,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g. api_base, forge_repo.owner)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },

    /// List effective configuration values
    List,
}

/// Shells supported by `completion`.
#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Reject blank commit messages at parse time, before any request is made.
fn commit_message(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("commit message cannot be empty".to_string());
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn mutations_require_message() {
        assert!(Cli::try_parse_from(["confrev", "rm", "a.yaml"]).is_err());
        assert!(Cli::try_parse_from(["confrev", "rollback", "a.yaml", "abc123"]).is_err());
        assert!(Cli::try_parse_from(["confrev", "rm", "a.yaml", "-m", "drop"]).is_ok());
    }

    #[test]
    fn blank_message_is_rejected() {
        for args in [
            vec!["confrev", "rm", "a.yaml", "-m", "   "],
            vec!["confrev", "edit", "a.yaml", "-m", ""],
            vec!["confrev", "rollback", "a.yaml", "abc123", "-m", "\t"],
        ] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn diff_new_defaults_to_latest() {
        let cli = Cli::try_parse_from(["confrev", "diff", "a.yaml", "abc123"]).unwrap();
        match cli.command {
            Command::Diff { old, new, .. } => {
                assert_eq!(old, "abc123");
                assert_eq!(new, "latest");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["confrev", "files", "--repo", "acme/config", "-b", "staging", "-y"])
                .unwrap();
        assert_eq!(cli.repo.as_deref(), Some("acme/config"));
        assert_eq!(cli.branch.as_deref(), Some("staging"));
        assert!(cli.yes);
    }
}
