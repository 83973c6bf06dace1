use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::debug;

use crate::api::UploadResponse;

pub const SSH_KEY_FIELD: &str = "sshKey";
pub const MODEL_FILE_FIELD: &str = "model_file";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("could not read {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{}", status_text(.status, .body))]
    Status { status: u16, body: String },
    #[error("{0}")]
    Rejected(String),
    #[error("server response did not include {0}")]
    MissingPath(&'static str),
}

fn status_text(status: &u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

/// Send `path` as a single-part multipart form under `field`.
///
/// Returns the decoded reply when the server accepted the file; a
/// `status: "error"` reply is turned into [`UploadError::Rejected`].
pub async fn upload_file(
    client: &reqwest::Client,
    url: &str,
    field: &'static str,
    path: &Path,
) -> Result<UploadResponse, UploadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| field.to_string());

    debug!(%url, field, file = %file_name, bytes = bytes.len(), "uploading file");

    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("application/octet-stream")?;
    let form = Form::new().part(field, part);

    let response = client.post(url).multipart(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UploadError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let reply: UploadResponse = response.json().await?;
    if reply.is_error() {
        return Err(UploadError::Rejected(
            reply
                .message
                .unwrap_or_else(|| "upload rejected".to_string()),
        ));
    }

    Ok(reply)
}
