//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod chat;
pub mod deploy;
pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgGroup, Args as ClapArgs, Parser, Subcommand};

use crate::cli::chat::{run_chat, ChatOptions};
use crate::cli::deploy::run_deploy;
use crate::cli::say::run_say;
use crate::core::config::{CliOverrides, Config};
use crate::core::deploy::DeploymentRequest;
use crate::core::server_url::SharedServerUrl;

#[derive(Parser, Debug)]
#[command(name = "modeldeck")]
#[command(version)]
#[command(about = "Chat with a self-hosted language model and deploy new ones")]
#[command(
    long_about = "modeldeck talks to a text-generation backend and to the deployment service \
that provisions it.\n\n\
The chat endpoint decides the reply mode: URLs ending in \"stream\" stream the reply \
as it is generated, anything else waits for the full answer.\n\n\
Environment Variables:\n\
  MODELDECK_CHAT_URL        Chat endpoint (overrides the config file)\n\
  MODELDECK_DEPLOY_SERVER   Deployment service address (overrides the config file)\n\
  MODELDECK_LOG             Diagnostic log filter (falls back to RUST_LOG)\n\n\
Commands inside chat:\n\
  /help             Show available commands\n\
  /server [url]     Show or change the chat endpoint\n\
  /save <file>      Save the history as JSON\n\
  /load <file>      Restore a saved history\n\
  /log <filename>   Enable logging to specified file\n\
  /log              Toggle logging pause/resume\n\
  /clear            Start over\n\
  /quit             Leave"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Chat endpoint to send prompts to
    #[arg(long, global = true, value_name = "URL")]
    pub server_url: Option<String>,

    /// Deployment service address
    #[arg(long, global = true, value_name = "URL")]
    pub deploy_server: Option<String>,

    /// Show debug diagnostics on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat(ChatArgs),
    /// Send a single prompt and print the reply
    Say {
        /// Prompt text (multiple words are joined with spaces)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Deploy a model to a remote host
    Deploy(DeployArgs),
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Show the current configuration
    Config,
}

#[derive(ClapArgs, Debug, Default)]
pub struct ChatArgs {
    /// Restore the conversation from a JSON history file
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<String>,
}

#[derive(ClapArgs, Debug)]
#[command(group(ArgGroup::new("model").required(true).args(["hf", "model_file"])))]
pub struct DeployArgs {
    /// Address of the machine to deploy to
    #[arg(long)]
    pub host: String,

    /// SSH user on the target host
    #[arg(long, value_name = "USER")]
    pub ssh_user: Option<String>,

    /// Private key to upload for the deployment
    #[arg(long, value_name = "FILE")]
    pub ssh_key: Option<PathBuf>,

    /// HuggingFace model link or id
    #[arg(long, value_name = "LINK")]
    pub hf: Option<String>,

    /// HuggingFace access token for gated models
    #[arg(long, value_name = "TOKEN", requires = "hf", conflicts_with = "model_file")]
    pub hf_token: Option<String>,

    /// Local model file to upload
    #[arg(long, value_name = "FILE")]
    pub model_file: Option<PathBuf>,

    /// Start chatting with the new deployment once it succeeds
    #[arg(long)]
    pub chat: bool,
}

impl DeployArgs {
    pub fn to_request(&self) -> DeploymentRequest {
        let mut request = match (&self.hf, &self.model_file) {
            (_, Some(file)) => DeploymentRequest::local(self.host.clone(), file.clone()),
            (link, None) => {
                DeploymentRequest::hugging_face(self.host.clone(), link.clone().unwrap_or_default())
            }
        };
        request.ssh_user = self.ssh_user.clone();
        request.ssh_key_file = self.ssh_key.clone();
        request.hf_token = self.hf_token.clone();
        request
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    crate::logging::init_tracing(args.verbose);

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let command = args
        .command
        .unwrap_or_else(|| Commands::Chat(ChatArgs::default()));

    match command {
        Commands::Set { key, value } => settings::run_set(&Config::get_config_path()?, &key, &value),
        Commands::Unset { key } => settings::run_unset(&Config::get_config_path()?, &key),
        Commands::Config => settings::run_config(&Config::get_config_path()?),
        command => {
            let config = match Config::load() {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("❌ {err}");
                    std::process::exit(1);
                }
            };
            let resolved = config.resolve(&CliOverrides {
                chat_url: args.server_url,
                deploy_server: args.deploy_server,
            });
            let client = reqwest::Client::new();
            let server_url = SharedServerUrl::new(resolved.chat_url.clone());

            match command {
                Commands::Say { prompt } => {
                    run_say(prompt, client, server_url, resolved.stream_idle_timeout).await
                }
                Commands::Deploy(deploy_args) => {
                    run_deploy(deploy_args, client, &resolved, server_url).await
                }
                Commands::Chat(chat_args) => {
                    let options = ChatOptions {
                        history: chat_args.history,
                        log: chat_args.log,
                        stream_idle_timeout: resolved.stream_idle_timeout,
                    };
                    run_chat(client, server_url, options).await
                }
                Commands::Set { .. } | Commands::Unset { .. } | Commands::Config => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests;
