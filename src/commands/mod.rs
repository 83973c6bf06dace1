//! Slash commands available in the chat REPL.

mod handlers;
mod registry;

pub use registry::{all_commands, find_command, Command, CommandInvocation, CommandUsage};

use crate::core::chat::ChatSession;
use crate::utils::logging::LoggingState;

/// Mutable state a command may touch.
pub struct CommandContext<'a> {
    pub session: &'a mut ChatSession,
    pub logging: &'a mut LoggingState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Nothing to report.
    Continue,
    /// Informational text for the user.
    Status(String),
    /// The command could not be carried out.
    Error(String),
    /// Not a command; send the text to the model.
    ProcessAsMessage(String),
    Quit,
}

pub fn process_input(ctx: &mut CommandContext<'_>, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match find_command(command_name) {
        Some(command) => (command.handler)(
            ctx,
            CommandInvocation {
                input: trimmed,
                args,
            },
        ),
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}
