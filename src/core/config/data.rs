use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Contents of `config.toml`. Every key is optional; unset keys fall back to
/// the defaults in [`super::defaults`].
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Query endpoint used by the chat session before any deployment.
    pub chat_url: Option<String>,
    /// Base address of the deployment service.
    pub deploy_server: Option<String>,
    /// SSH user sent with a deployment when none is given.
    pub ssh_user: Option<String>,
    /// Key path the deployment service should use when no key was uploaded.
    pub fallback_ssh_key: Option<String>,
    pub deploy_timeout_secs: Option<u64>,
    pub health_timeout_secs: Option<u64>,
    /// Abandon a streaming reply after this many seconds without a chunk.
    pub stream_idle_timeout_secs: Option<u64>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
///
/// # Examples
/// - Unix: `/home/user/.config/modeldeck/config.toml` → `~/.config/modeldeck/config.toml`
/// - macOS: `/Users/user/Library/Application Support/...` → `~/Library/Application Support/...`
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
