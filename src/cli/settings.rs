//! Settings management for CLI set/unset commands.

use std::path::Path;

use thiserror::Error;

use crate::core::config::data::path_display;
use crate::core::config::{Config, ConfigError};

/// Keys accepted by `modeldeck set` and `modeldeck unset`, in display order.
pub const KEYS: &[&str] = &[
    "chat-url",
    "deploy-server",
    "ssh-user",
    "fallback-ssh-key",
    "deploy-timeout",
    "health-timeout",
    "stream-idle-timeout",
];

#[derive(Debug, Error)]
pub enum SettingError {
    #[error("Unknown config key: {0}")]
    UnknownKey(String),
    #[error("To set {key}, specify a value")]
    MissingValue { key: String },
    #[error("{key} expects a whole number of seconds, got: {value}")]
    InvalidSeconds { key: String, value: String },
    #[error("{key} must be at least 1 second")]
    ZeroTimeout { key: String },
    #[error("{key} expects an http(s) URL, got: {value}")]
    InvalidUrl { key: String, value: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SettingError {
    /// Print the error message to stderr with appropriate formatting.
    pub fn print(&self) {
        match self {
            SettingError::UnknownKey(_) => {
                eprintln!("❌ {self}");
                eprintln!("   Known keys: {}", KEYS.join(", "));
            }
            SettingError::MissingValue { key } => {
                eprintln!("⚠️  {self}");
                eprintln!("Example: modeldeck set {key} {}", example_value(key));
            }
            _ => eprintln!("❌ {self}"),
        }
    }
}

fn example_value(key: &str) -> &'static str {
    match key {
        "chat-url" => "http://10.0.0.5/stream",
        "deploy-server" => "http://10.0.0.2:8000",
        "ssh-user" => "ubuntu",
        "fallback-ssh-key" => "~/.ssh/id_ed25519",
        _ => "30",
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<u64, SettingError> {
    value
        .trim_end_matches('s')
        .parse()
        .map_err(|_| SettingError::InvalidSeconds {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_timeout(key: &str, value: &str) -> Result<u64, SettingError> {
    match parse_seconds(key, value)? {
        0 => Err(SettingError::ZeroTimeout {
            key: key.to_string(),
        }),
        secs => Ok(secs),
    }
}

fn parse_url(key: &str, value: &str) -> Result<String, SettingError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value.to_string())
    } else {
        Err(SettingError::InvalidUrl {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Apply `key = value` to `config`. Returns the confirmation to print.
pub fn apply_set(config: &mut Config, key: &str, value: &str) -> Result<String, SettingError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(if KEYS.contains(&key) {
            SettingError::MissingValue {
                key: key.to_string(),
            }
        } else {
            SettingError::UnknownKey(key.to_string())
        });
    }

    match key {
        "chat-url" => config.chat_url = Some(parse_url(key, value)?),
        "deploy-server" => config.deploy_server = Some(parse_url(key, value)?),
        "ssh-user" => config.ssh_user = Some(value.to_string()),
        "fallback-ssh-key" => config.fallback_ssh_key = Some(value.to_string()),
        "deploy-timeout" => config.deploy_timeout_secs = Some(parse_timeout(key, value)?),
        "health-timeout" => config.health_timeout_secs = Some(parse_timeout(key, value)?),
        "stream-idle-timeout" => {
            config.stream_idle_timeout_secs = Some(parse_seconds(key, value)?)
        }
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    Ok(format!("✅ Set {key} to: {value}"))
}

pub fn apply_unset(config: &mut Config, key: &str) -> Result<String, SettingError> {
    match key {
        "chat-url" => config.chat_url = None,
        "deploy-server" => config.deploy_server = None,
        "ssh-user" => config.ssh_user = None,
        "fallback-ssh-key" => config.fallback_ssh_key = None,
        "deploy-timeout" => config.deploy_timeout_secs = None,
        "health-timeout" => config.health_timeout_secs = None,
        "stream-idle-timeout" => config.stream_idle_timeout_secs = None,
        _ => return Err(SettingError::UnknownKey(key.to_string())),
    }
    Ok(format!("✅ Unset {key}"))
}

fn update_config<F>(config_path: &Path, apply: F) -> Result<String, SettingError>
where
    F: FnOnce(&mut Config) -> Result<String, SettingError>,
{
    let mut config = Config::load_from_path(config_path)?;
    let message = apply(&mut config)?;
    config.save_to_path(config_path)?;
    Ok(message)
}

fn finish(result: Result<String, SettingError>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => {
            err.print();
            std::process::exit(1);
        }
    }
}

pub fn run_set(config_path: &Path, key: &str, value: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let value = value.join(" ");
    finish(update_config(config_path, |config| {
        apply_set(config, key, &value)
    }))
}

pub fn run_unset(config_path: &Path, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    finish(update_config(config_path, |config| apply_unset(config, key)))
}

pub fn run_config(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::load_from_path(config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("❌ {err}");
            std::process::exit(1);
        }
    };
    println!("Config file: {}", path_display(config_path));
    config.print_all();
    Ok(())
}
