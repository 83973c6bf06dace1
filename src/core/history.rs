//! JSON persistence of a chat history.
//!
//! A file holds the message list as-is: `[{"role":"User","content":"hi"}]`.
//! Loading replaces a session's history wholesale.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::config::data::path_display;
use crate::core::message::ChatMessage;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to read history at {}: {source}", path_display(.path))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid history file {}: {source}", path_display(.path))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to write history at {}: {source}", path_display(.path))]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn load_history(path: &Path) -> Result<Vec<ChatMessage>, HistoryError> {
    let contents = fs::read_to_string(path).map_err(|source| HistoryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| HistoryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_history(path: &Path, messages: &[ChatMessage]) -> Result<(), HistoryError> {
    let write_err = |source: std::io::Error| HistoryError::Write {
        path: path.to_path_buf(),
        source,
    };
    let contents = serde_json::to_string_pretty(messages)?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(parent).map_err(write_err)?;
    temp_file
        .write_all(contents.as_bytes())
        .map_err(write_err)?;
    temp_file.write_all(b"\n").map_err(write_err)?;
    temp_file
        .persist(path)
        .map_err(|err| write_err(err.error))?;
    Ok(())
}
