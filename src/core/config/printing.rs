use crate::core::config::data::Config;
use crate::core::config::defaults::{
    DEFAULT_CHAT_URL, DEFAULT_DEPLOY_SERVER, DEFAULT_DEPLOY_TIMEOUT_SECS,
    DEFAULT_FALLBACK_SSH_KEY, DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_SSH_USER,
};

impl Config {
    pub fn print_all(&self) {
        println!("Current configuration:");
        for line in self.display_lines() {
            println!("{line}");
        }
    }

    /// One `  key: value` line per setting, defaults marked as such.
    pub fn display_lines(&self) -> Vec<String> {
        fn text(key: &str, value: &Option<String>, default: &str) -> String {
            match value {
                Some(value) => format!("  {key}: {value}"),
                None => format!("  {key}: {default} (default)"),
            }
        }
        fn secs(key: &str, value: Option<u64>, default: Option<u64>) -> String {
            match (value, default) {
                (Some(value), _) => format!("  {key}: {value}s"),
                (None, Some(default)) => format!("  {key}: {default}s (default)"),
                (None, None) => format!("  {key}: (unset)"),
            }
        }

        vec![
            text("chat-url", &self.chat_url, DEFAULT_CHAT_URL),
            text("deploy-server", &self.deploy_server, DEFAULT_DEPLOY_SERVER),
            text("ssh-user", &self.ssh_user, DEFAULT_SSH_USER),
            text("fallback-ssh-key", &self.fallback_ssh_key, DEFAULT_FALLBACK_SSH_KEY),
            secs(
                "deploy-timeout",
                self.deploy_timeout_secs,
                Some(DEFAULT_DEPLOY_TIMEOUT_SECS),
            ),
            secs(
                "health-timeout",
                self.health_timeout_secs,
                Some(DEFAULT_HEALTH_TIMEOUT_SECS),
            ),
            secs("stream-idle-timeout", self.stream_idle_timeout_secs, None),
        ]
    }
}
