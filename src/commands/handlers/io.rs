use super::{single_arg, usage_status};
use crate::commands::registry::CommandInvocation;
use crate::commands::{CommandContext, CommandResult};
use crate::core::history::{load_history, save_history};
use std::path::Path;

const USAGE_LOG: &str = "Usage: /log [filename]";
const USAGE_SAVE: &str = "Usage: /save <filename>";
const USAGE_LOAD: &str = "Usage: /load <filename>";

pub(crate) fn handle_log(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    match invocation.args_len() {
        0 => match ctx.logging.toggle_logging("Logging paused") {
            Ok(message) => CommandResult::Status(message),
            Err(e) => CommandResult::Error(format!("Log error: {e}")),
        },
        1 => match ctx.logging.set_log_file(invocation.args.to_string()) {
            Ok(message) => CommandResult::Status(message),
            Err(e) => CommandResult::Error(format!("Logfile error: {e}")),
        },
        _ => usage_status(USAGE_LOG),
    }
}

pub(crate) fn handle_save(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let filename = match single_arg(&invocation, USAGE_SAVE) {
        Ok(filename) => filename,
        Err(usage) => return usage,
    };

    match save_history(Path::new(filename), ctx.session.messages()) {
        Ok(()) => CommandResult::Status(format!(
            "Saved {} messages to {filename}",
            ctx.session.messages().len()
        )),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

pub(crate) fn handle_load(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let filename = match single_arg(&invocation, USAGE_LOAD) {
        Ok(filename) => filename,
        Err(usage) => return usage,
    };

    let messages = match load_history(Path::new(filename)) {
        Ok(messages) => messages,
        Err(e) => return CommandResult::Error(e.to_string()),
    };
    let count = messages.len();
    ctx.session.replace_history(messages);

    if let Err(e) = ctx.logging.rewrite_log(ctx.session.messages()) {
        return CommandResult::Error(format!("History loaded, but the log could not be rewritten: {e}"));
    }
    CommandResult::Status(format!("Loaded {count} messages from {filename}"))
}
