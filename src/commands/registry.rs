use super::handlers;
use super::{CommandContext, CommandResult};

pub type CommandHandler = fn(&mut CommandContext<'_>, CommandInvocation<'_>) -> CommandResult;

pub struct CommandUsage {
    pub syntax: &'static str,
    pub description: &'static str,
}

pub struct Command {
    pub name: &'static str,
    pub usages: &'static [CommandUsage],
    pub handler: CommandHandler,
}

#[derive(Clone, Copy, Debug)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    pub fn args_iter(&self) -> impl Iterator<Item = &'a str> {
        self.args.split_whitespace()
    }

    pub fn args_len(&self) -> usize {
        self.args_iter().count()
    }

    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args_iter().nth(index)
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usages: &[CommandUsage {
            syntax: "/help",
            description: "Show available commands.",
        }],
        handler: handlers::core::handle_help,
    },
    Command {
        name: "clear",
        usages: &[CommandUsage {
            syntax: "/clear",
            description: "Start over with an empty history.",
        }],
        handler: handlers::core::handle_clear,
    },
    Command {
        name: "server",
        usages: &[
            CommandUsage {
                syntax: "/server",
                description: "Show the chat endpoint requests go to.",
            },
            CommandUsage {
                syntax: "/server <url>",
                description: "Send requests to another endpoint (URLs ending in \"stream\" stream replies).",
            },
        ],
        handler: handlers::core::handle_server,
    },
    Command {
        name: "save",
        usages: &[CommandUsage {
            syntax: "/save <file>",
            description: "Write the history to a JSON file.",
        }],
        handler: handlers::io::handle_save,
    },
    Command {
        name: "load",
        usages: &[CommandUsage {
            syntax: "/load <file>",
            description: "Replace the history with one saved earlier.",
        }],
        handler: handlers::io::handle_load,
    },
    Command {
        name: "log",
        usages: &[
            CommandUsage {
                syntax: "/log <file>",
                description: "Record the conversation to a text file.",
            },
            CommandUsage {
                syntax: "/log",
                description: "Pause or resume recording.",
            },
        ],
        handler: handlers::io::handle_log,
    },
    Command {
        name: "quit",
        usages: &[CommandUsage {
            syntax: "/quit",
            description: "Leave the chat.",
        }],
        handler: handlers::core::handle_quit,
    },
];
