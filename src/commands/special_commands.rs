//! Special commands parser for interactive chat mode
//!
//! Lines starting with `/` are handled locally instead of being sent to the
//! model:
//! - `/clear` resets the transcript
//! - `/good` and `/bad` record feedback on the last exchange
//! - `/history` reprints the transcript
//! - `/help` and `/exit`
//!
//! Commands are case-insensitive.

use crate::chat::FeedbackKind;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Reset the transcript to the greeting and clear storage
    Clear,

    /// Rate the last exchange
    Feedback(FeedbackKind),

    /// Print the transcript
    ShowHistory,

    /// Display help information
    Help,

    /// Leave the chat
    Exit,

    /// Not a special command; send the line to the model
    None,
}

/// Parse user input into a special command
///
/// # Examples
///
/// ```
/// use ticketassist::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/clear").unwrap(), SpecialCommand::Clear);
/// assert_eq!(parse_special_command("why is UPF down?").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/clear" | "/reset" => Ok(SpecialCommand::Clear),
        "/good" | "/+1" => Ok(SpecialCommand::Feedback(FeedbackKind::Positive)),
        "/bad" | "/-1" => Ok(SpecialCommand::Feedback(FeedbackKind::Negative)),
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),
        other => {
            let cmd = other.split_whitespace().next().unwrap_or(other);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands
================

  /clear          - Clear the chat history and start over
  /good, /+1      - Mark the last answer as helpful
  /bad, /-1       - Mark the last answer as unhelpful
  /history        - Show the conversation so far
  /help, /?       - Show this help message
  /exit, exit     - Leave the chat

Anything else is sent to the assistant. Prompts are limited to 150 characters.
"#
    );
}
