//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

impl From<io::Error> for PromptError {
    fn from(err: io::Error) -> Self {
        PromptError::IoError(err.to_string())
    }
}

/// Interpret a yes/no answer. Blank input takes `default`.
pub fn parse_answer(answer: &str, default: bool) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" => Some(default),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Prompt for confirmation (yes/no) on stdin.
///
/// Returns `Ok(true)` if the user confirms, `Ok(false)` if they decline.
/// Returns `Err(PromptError::NotInteractive)` if not in interactive mode
/// and `Err(PromptError::Cancelled)` on end of input.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let stdin = io::stdin();
    confirm_with(message, default, &mut stdin.lock(), &mut io::stderr())
}

/// [`confirm`] over arbitrary streams.
pub fn confirm_with<R: BufRead, W: Write>(
    message: &str,
    default: bool,
    input: &mut R,
    output: &mut W,
) -> Result<bool, PromptError> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };
    loop {
        write!(output, "{} {} ", message, hint)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        match parse_answer(&line, default) {
            Some(answer) => return Ok(answer),
            None => writeln!(output, "Please answer 'y' or 'n'.")?,
        }
    }
}

/// Prompt for masked input (e.g., passwords, tokens).
///
/// The input is not echoed to the terminal.
pub fn password(message: &str, interactive: bool) -> Result<String, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }
    let value = rpassword::prompt_password(format!("{}: ", message))?;
    Ok(value.trim().to_string())
}
