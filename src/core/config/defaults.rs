//! Built-in defaults and the layering of file, environment and flags.

use std::time::Duration;

use crate::core::config::data::Config;
use crate::core::deploy::{DeployEndpoints, DeploySettings};

pub const DEFAULT_CHAT_URL: &str = "http://localhost:8080/query";
pub const DEFAULT_DEPLOY_SERVER: &str = "http://localhost:8000";
pub const DEFAULT_SSH_USER: &str = "root";
pub const DEFAULT_FALLBACK_SSH_KEY: &str = "~/.ssh/id_rsa";
pub const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

pub const CHAT_URL_ENV: &str = "MODELDECK_CHAT_URL";
pub const DEPLOY_SERVER_ENV: &str = "MODELDECK_DEPLOY_SERVER";

/// Values given on the command line. They win over everything else.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub chat_url: Option<String>,
    pub deploy_server: Option<String>,
}

/// Effective settings after layering defaults, file, environment and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub chat_url: String,
    pub deploy_server: String,
    pub deploy: DeploySettings,
    pub stream_idle_timeout: Option<Duration>,
}

impl ResolvedConfig {
    pub fn deploy_endpoints(&self) -> DeployEndpoints {
        DeployEndpoints::from_server(&self.deploy_server)
    }
}

impl Config {
    pub fn resolve(&self, overrides: &CliOverrides) -> ResolvedConfig {
        self.resolve_with_env(overrides, |name| std::env::var(name).ok())
    }

    /// Same as [`Config::resolve`] with an injectable environment lookup.
    pub fn resolve_with_env<E>(&self, overrides: &CliOverrides, env: E) -> ResolvedConfig
    where
        E: Fn(&str) -> Option<String>,
    {
        let pick = |flag: &Option<String>, var: &str, file: &Option<String>, default: &str| {
            non_empty(flag.clone())
                .or_else(|| non_empty(env(var)))
                .or_else(|| non_empty(file.clone()))
                .unwrap_or_else(|| default.to_string())
        };

        ResolvedConfig {
            chat_url: pick(&overrides.chat_url, CHAT_URL_ENV, &self.chat_url, DEFAULT_CHAT_URL),
            deploy_server: pick(
                &overrides.deploy_server,
                DEPLOY_SERVER_ENV,
                &self.deploy_server,
                DEFAULT_DEPLOY_SERVER,
            ),
            deploy: DeploySettings {
                deploy_timeout: positive_secs(self.deploy_timeout_secs, DEFAULT_DEPLOY_TIMEOUT_SECS),
                health_timeout: positive_secs(self.health_timeout_secs, DEFAULT_HEALTH_TIMEOUT_SECS),
                fallback_ssh_key: non_empty(self.fallback_ssh_key.clone())
                    .unwrap_or_else(|| DEFAULT_FALLBACK_SSH_KEY.to_string()),
                default_ssh_user: non_empty(self.ssh_user.clone())
                    .unwrap_or_else(|| DEFAULT_SSH_USER.to_string()),
            },
            stream_idle_timeout: self
                .stream_idle_timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }
}

/// A zero bound would fail every request, so it counts as unset.
fn positive_secs(value: Option<u64>, default: u64) -> Duration {
    Duration::from_secs(value.filter(|secs| *secs > 0).unwrap_or(default))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
