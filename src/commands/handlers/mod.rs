pub(super) mod core;
pub(super) mod io;

use crate::commands::registry::CommandInvocation;
use crate::commands::CommandResult;

pub(super) fn usage_status(usage: &'static str) -> CommandResult {
    CommandResult::Error(usage.to_string())
}

pub(super) fn single_arg<'a>(
    invocation: &CommandInvocation<'a>,
    usage: &'static str,
) -> Result<&'a str, CommandResult> {
    match (invocation.arg(0), invocation.args_len()) {
        (Some(value), 1) => Ok(value),
        _ => Err(usage_status(usage)),
    }
}
