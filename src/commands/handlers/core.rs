use super::usage_status;
use crate::commands::registry::CommandInvocation;
use crate::commands::{all_commands, CommandContext, CommandResult};
use crate::utils::url::is_streaming_url;

const USAGE_SERVER: &str = "Usage: /server [url]";

pub(crate) fn handle_help(
    _ctx: &mut CommandContext<'_>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    let mut help = String::from("Commands:");
    let width = all_commands()
        .iter()
        .flat_map(|command| command.usages)
        .map(|usage| usage.syntax.len())
        .max()
        .unwrap_or(0);
    for usage in all_commands().iter().flat_map(|command| command.usages) {
        help.push_str(&format!(
            "\n  {:<width$}  {}",
            usage.syntax, usage.description
        ));
    }
    help.push_str("\nAnything else is sent to the model.");
    CommandResult::Status(help)
}

pub(crate) fn handle_clear(
    ctx: &mut CommandContext<'_>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    ctx.session.clear();
    if let Err(err) = ctx.logging.rewrite_log(&[]) {
        return CommandResult::Error(format!("History cleared, but the log could not be reset: {err}"));
    }
    CommandResult::Status("History cleared".to_string())
}

pub(crate) fn handle_server(
    ctx: &mut CommandContext<'_>,
    invocation: CommandInvocation<'_>,
) -> CommandResult {
    let shared = ctx.session.server_url();
    match invocation.args_len() {
        0 => {
            let current = shared.current();
            let mode = if is_streaming_url(&current) {
                "streaming"
            } else {
                "batch"
            };
            CommandResult::Status(format!("Chat endpoint: {current} ({mode})"))
        }
        1 => {
            let url = invocation.args.to_string();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return CommandResult::Error(format!(
                    "Not an http(s) URL: {url}"
                ));
            }
            shared.publish(url.clone());
            CommandResult::Status(format!("Chat endpoint set to: {url}"))
        }
        _ => usage_status(USAGE_SERVER),
    }
}

pub(crate) fn handle_quit(
    _ctx: &mut CommandContext<'_>,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::Quit
}
