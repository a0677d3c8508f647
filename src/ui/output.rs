//! ui::output
//!
//! Where messages go.
//!
//! Command results (listings, file content, diffs) go to stdout and are
//! printed even under `--quiet` so scripts can consume them. Status lines
//! go to stdout and are suppressed by `--quiet`. Warnings, errors and
//! debug notes go to stderr.

use std::fmt::Display;

/// How chatty the CLI is for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// `--quiet`: results and errors only
    Quiet,
    Normal,
    /// `--debug`: adds `[debug]` notes on stderr
    Debug,
}

impl Verbosity {
    /// `--quiet` wins over `--debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        match (quiet, debug) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Debug,
            (false, false) => Verbosity::Normal,
        }
    }

    fn chatty(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// The primary result of a command. Always printed.
pub fn result(content: impl Display) {
    println!("{}", content);
}

/// An informational line, such as a hint or an empty-listing notice.
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity.chatty() {
        println!("{}", message);
    }
}

/// Confirmation that a mutation went through.
pub fn success(message: impl Display, verbosity: Verbosity) {
    if verbosity.chatty() {
        println!("{}", message);
    }
}

pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity.chatty() {
        eprintln!("warning: {}", message);
    }
}

/// Errors are never suppressed.
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
    }

    #[test]
    fn only_quiet_silences_status() {
        assert!(!Verbosity::Quiet.chatty());
        assert!(Verbosity::Normal.chatty());
        assert!(Verbosity::Debug.chatty());
    }
}
