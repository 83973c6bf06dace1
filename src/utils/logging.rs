//! Plain-text transcript of a chat session.

use crate::core::message::ChatMessage;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("No log file specified. Use /log <filename> to enable logging first.")]
    NoFile,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Persist(#[from] tempfile::PersistError),
}

#[derive(Debug, Default)]
pub struct LoggingState {
    file_path: Option<String>,
    is_active: bool,
}

impl LoggingState {
    /// A path given up front (`--log`) starts logging immediately.
    pub fn new(log_file: Option<String>) -> Result<Self, LogError> {
        let mut logging = LoggingState::default();
        if let Some(path) = log_file {
            logging.set_log_file(path)?;
        }
        Ok(logging)
    }

    pub fn set_log_file(&mut self, path: String) -> Result<String, LogError> {
        // Fail now rather than on the first message.
        OpenOptions::new().create(true).append(true).open(&path)?;

        self.file_path = Some(path.clone());
        self.is_active = true;

        Ok(format!("Logging enabled to: {path}"))
    }

    pub fn toggle_logging(&mut self, pause_message: &str) -> Result<String, LogError> {
        let Some(path) = self.file_path.clone() else {
            return Err(LogError::NoFile);
        };

        if self.is_active {
            self.write_entry(&format!("## {pause_message}"))?;
            self.is_active = false;
            Ok(format!("Logging paused (file: {path})"))
        } else {
            self.is_active = true;
            Ok(format!("Logging resumed to: {path}"))
        }
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        let name = |path: &str| {
            Path::new(path)
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .into_owned()
        };
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", name(path)),
            (Some(path), false) => format!("paused ({})", name(path)),
        }
    }

    /// Append one message. Empty assistant placeholders are skipped.
    pub fn log_message(&self, message: &ChatMessage) -> Result<(), LogError> {
        if !self.is_active {
            return Ok(());
        }
        match transcript_entry(message) {
            Some(entry) => self.write_entry(&entry),
            None => Ok(()),
        }
    }

    fn write_entry(&self, content: &str) -> Result<(), LogError> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);
        write_block(&mut writer, content)?;
        writer.flush()?;
        Ok(())
    }

    /// Replace the log with `messages`. Used after history is cleared or
    /// loaded so the file matches what the session holds.
    pub fn rewrite_log(&self, messages: &[ChatMessage]) -> Result<(), LogError> {
        let Some(file_path) = self.file_path.as_deref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let parent = Path::new(file_path)
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(parent)?;

        for entry in messages.iter().filter_map(transcript_entry) {
            write_block(&mut temp_file, &entry)?;
        }

        temp_file.flush()?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(file_path)?;
        Ok(())
    }
}

fn transcript_entry(message: &ChatMessage) -> Option<String> {
    if message.is_error() {
        Some(format!("## {}", message.content))
    } else if message.role.is_user() {
        Some(format!("User: {}", message.content))
    } else if message.content.is_empty() {
        None
    } else {
        Some(message.content.clone())
    }
}

fn write_block(writer: &mut impl Write, content: &str) -> std::io::Result<()> {
    for line in content.lines() {
        writeln!(writer, "{line}")?;
    }
    writeln!(writer)
}
