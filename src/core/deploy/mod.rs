//! Deployment orchestrator.
//!
//! Validates the form, uploads the attached SSH key and model file, posts the
//! resulting [`DeploymentConfig`] to the deployment service and reports
//! progress through a [`DeploymentState`] watch channel. A successful deploy
//! retargets the chat session through the [`SharedServerUrl`].

pub mod probe;
pub mod upload;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::DeployResponse;
use crate::core::server_url::SharedServerUrl;
use crate::utils::url::{construct_api_url, derive_query_url};

use self::probe::{spawn_probe, ProbeOutcome};
use self::upload::{upload_file, UploadError, MODEL_FILE_FIELD, SSH_KEY_FIELD};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Deployment initiated successfully!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelSource {
    #[default]
    #[serde(rename = "huggingface")]
    HuggingFace,
    #[serde(rename = "local")]
    Local,
}

impl ModelSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelSource::HuggingFace => "huggingface",
            ModelSource::Local => "local",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeploymentState {
    pub status: DeploymentStatus,
    pub message: String,
}

impl DeploymentState {
    fn new(status: DeploymentStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// What the user filled in. Files are local paths that still need uploading.
#[derive(Debug, Clone, Default)]
pub struct DeploymentRequest {
    pub host: String,
    pub ssh_user: Option<String>,
    pub ssh_key_file: Option<PathBuf>,
    pub model_source: ModelSource,
    pub hf_link: String,
    pub hf_token: Option<String>,
    pub model_file: Option<PathBuf>,
}

impl DeploymentRequest {
    pub fn hugging_face(host: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model_source: ModelSource::HuggingFace,
            hf_link: link.into(),
            ..Self::default()
        }
    }

    pub fn local(host: impl Into<String>, model_file: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            model_source: ModelSource::Local,
            model_file: Some(model_file.into()),
            ..Self::default()
        }
    }

    pub fn with_ssh_user(mut self, user: impl Into<String>) -> Self {
        self.ssh_user = Some(user.into());
        self
    }

    pub fn with_ssh_key_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssh_key_file = Some(path.into());
        self
    }

    pub fn with_hf_token(mut self, token: impl Into<String>) -> Self {
        self.hf_token = Some(token.into());
        self
    }

    /// Checks that need no network access.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.host.trim().is_empty() {
            return Err(DeployError::MissingHost);
        }
        match self.model_source {
            ModelSource::HuggingFace if self.hf_link.trim().is_empty() => {
                Err(DeployError::MissingModelLink)
            }
            ModelSource::Local if self.model_file.is_none() => Err(DeployError::MissingModelFile),
            _ => Ok(()),
        }
    }
}

/// Where the deployed model comes from. Exactly one variant ends up in the
/// deploy payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelLocation {
    HuggingFace { link: String, token: String },
    Uploaded { file_path: String },
}

/// Payload of the deploy call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentConfig {
    host: String,
    ssh_user: String,
    ssh_key: String,
    model_source: ModelSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    hf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hf_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_file_path: Option<String>,
}

impl DeploymentConfig {
    pub fn new(
        host: impl Into<String>,
        ssh_user: impl Into<String>,
        ssh_key: impl Into<String>,
        location: ModelLocation,
    ) -> Self {
        let (model_source, hf, hf_token, model_file_path) = match location {
            ModelLocation::HuggingFace { link, token } => {
                (ModelSource::HuggingFace, Some(link), Some(token), None)
            }
            ModelLocation::Uploaded { file_path } => {
                (ModelSource::Local, None, None, Some(file_path))
            }
        };

        Self {
            host: host.into(),
            ssh_user: ssh_user.into(),
            ssh_key: ssh_key.into(),
            model_source,
            hf,
            hf_token,
            model_file_path,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ssh_user(&self) -> &str {
        &self.ssh_user
    }

    pub fn ssh_key(&self) -> &str {
        &self.ssh_key
    }

    pub fn model_source(&self) -> ModelSource {
        self.model_source
    }
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Server IP address is required")]
    MissingHost,
    #[error("HuggingFace model link is required")]
    MissingModelLink,
    #[error("Please upload a model file")]
    MissingModelFile,
    #[error("Model file upload failed: {0}")]
    ModelUpload(#[source] UploadError),
    #[error("Connection timed out. The server might be down or unreachable.")]
    Timeout(Duration),
    #[error("Network error: Could not connect to the deployment server. Please check if the server is running and accessible.")]
    Network(#[source] reqwest::Error),
    #[error("Deployment failed with status: {status}.{}", body_suffix(.body))]
    Status { status: u16, body: String },
    #[error("Deployment failed: {0}")]
    Other(#[source] reqwest::Error),
}

fn body_suffix(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(" {body}")
    }
}

impl DeployError {
    /// Failures detected before any request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DeployError::MissingHost | DeployError::MissingModelLink | DeployError::MissingModelFile
        )
    }

    /// Failures of the deploy call itself, which trigger the health probe.
    fn is_deploy_stage(&self) -> bool {
        matches!(
            self,
            DeployError::Timeout(_)
                | DeployError::Network(_)
                | DeployError::Status { .. }
                | DeployError::Other(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployEndpoints {
    pub upload_ssh_key: String,
    pub upload_model_file: String,
    pub deploy: String,
    pub health: String,
}

impl DeployEndpoints {
    /// All four endpoints under one deployment-service address.
    pub fn from_server(base_url: &str) -> Self {
        Self {
            upload_ssh_key: construct_api_url(base_url, "upload-ssh-key"),
            upload_model_file: construct_api_url(base_url, "upload-model-file"),
            deploy: construct_api_url(base_url, "deploy"),
            health: construct_api_url(base_url, "health"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySettings {
    pub deploy_timeout: Duration,
    pub health_timeout: Duration,
    pub fallback_ssh_key: String,
    pub default_ssh_user: String,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            deploy_timeout: Duration::from_secs(30),
            health_timeout: Duration::from_secs(5),
            fallback_ssh_key: "~/.ssh/id_rsa".to_string(),
            default_ssh_user: "root".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct DeployOutcome {
    pub state: DeploymentState,
    /// The payload that was (or would have been) sent to the deploy endpoint.
    pub config: Option<DeploymentConfig>,
    /// Chat URL published after a successful deploy.
    pub published_url: Option<String>,
    pub error: Option<DeployError>,
    /// Non-fatal problems along the way, such as a key upload that fell back
    /// to the default key. Progress messages can be coalesced by the status
    /// channel; these cannot.
    pub warnings: Vec<String>,
    /// Background health probe started after a failed deploy call.
    pub probe: Option<JoinHandle<ProbeOutcome>>,
}

impl DeployOutcome {
    pub fn is_success(&self) -> bool {
        self.state.status == DeploymentStatus::Success
    }
}

pub struct DeployOrchestrator {
    client: reqwest::Client,
    endpoints: DeployEndpoints,
    settings: DeploySettings,
    server_url: SharedServerUrl,
    status: watch::Sender<DeploymentState>,
}

impl DeployOrchestrator {
    pub fn new(
        client: reqwest::Client,
        endpoints: DeployEndpoints,
        settings: DeploySettings,
        server_url: SharedServerUrl,
    ) -> Self {
        let (status, _) = watch::channel(DeploymentState::default());
        Self {
            client,
            endpoints,
            settings,
            server_url,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DeploymentState> {
        self.status.subscribe()
    }

    pub fn state(&self) -> DeploymentState {
        self.status.borrow().clone()
    }

    pub async fn deploy(&self, request: &DeploymentRequest) -> DeployOutcome {
        self.report(DeploymentStatus::Loading, "Preparing deployment data...");

        if let Err(err) = request.validate() {
            return self.fail(err, None, Vec::new());
        }

        let mut warnings = Vec::new();
        let ssh_key = self.resolve_ssh_key(request, &mut warnings).await;
        let ssh_user = request
            .ssh_user
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .unwrap_or(self.settings.default_ssh_user.as_str())
            .to_string();

        let location = match request.model_source {
            ModelSource::HuggingFace => ModelLocation::HuggingFace {
                link: request.hf_link.trim().to_string(),
                token: request.hf_token.clone().unwrap_or_default(),
            },
            ModelSource::Local => match self.upload_model_file(request).await {
                Ok(file_path) => ModelLocation::Uploaded { file_path },
                Err(err) => return self.fail(DeployError::ModelUpload(err), None, warnings),
            },
        };

        let config = DeploymentConfig::new(request.host.trim(), ssh_user, ssh_key, location);

        self.report(DeploymentStatus::Loading, "Sending data to deployment server...");
        match self.send_deploy(&config).await {
            Ok(message) => {
                let query_url = derive_query_url(config.host());
                self.server_url.publish(query_url.clone());
                info!(host = %config.host(), %query_url, "deployment initiated");
                let state = self.report(DeploymentStatus::Success, message);
                DeployOutcome {
                    state,
                    config: Some(config),
                    published_url: Some(query_url),
                    error: None,
                    warnings,
                    probe: None,
                }
            }
            Err(err) => self.fail(err, Some(config), warnings),
        }
    }

    /// Upload the attached key if any. Never fails: any problem falls back to
    /// the configured default key path and records a warning.
    async fn resolve_ssh_key(&self, request: &DeploymentRequest, warnings: &mut Vec<String>) -> String {
        let Some(path) = &request.ssh_key_file else {
            self.report(DeploymentStatus::Loading, "Using default SSH key...");
            return self.settings.fallback_ssh_key.clone();
        };

        self.report(DeploymentStatus::Loading, "Uploading SSH key...");
        let uploaded = upload_file(&self.client, &self.endpoints.upload_ssh_key, SSH_KEY_FIELD, path)
            .await
            .and_then(|reply| reply.key_path.ok_or(UploadError::MissingPath("key_path")));

        match uploaded {
            Ok(key_path) => {
                info!(%key_path, "ssh key uploaded");
                self.report(
                    DeploymentStatus::Loading,
                    "SSH key uploaded successfully. Preparing deployment...",
                );
                key_path
            }
            Err(err) => {
                warn!(error = %err, fallback = %self.settings.fallback_ssh_key, "ssh key upload failed");
                let notice = format!("SSH key upload failed: {err}. Using default key path.");
                self.report(DeploymentStatus::Loading, notice.clone());
                warnings.push(notice);
                self.settings.fallback_ssh_key.clone()
            }
        }
    }

    /// Upload the model file. Unlike the key upload, failure here is fatal.
    async fn upload_model_file(&self, request: &DeploymentRequest) -> Result<String, UploadError> {
        let path = request
            .model_file
            .as_ref()
            .ok_or(UploadError::MissingPath("a model file"))?;

        self.report(DeploymentStatus::Loading, "Uploading model file...");
        let reply =
            upload_file(&self.client, &self.endpoints.upload_model_file, MODEL_FILE_FIELD, path)
                .await?;
        let file_path = reply.file_path.ok_or(UploadError::MissingPath("file_path"))?;

        info!(%file_path, "model file uploaded");
        self.report(
            DeploymentStatus::Loading,
            "Model file uploaded successfully. Preparing deployment...",
        );
        Ok(file_path)
    }

    async fn send_deploy(&self, config: &DeploymentConfig) -> Result<String, DeployError> {
        let timeout = self.settings.deploy_timeout;
        let send = self.client.post(&self.endpoints.deploy).json(config).send();

        // Dropping the in-flight future on timeout cancels the request.
        let response = match tokio::time::timeout(timeout, send).await {
            Err(_) => return Err(DeployError::Timeout(timeout)),
            Ok(result) => result.map_err(|err| self.classify(err))?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeployError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: DeployResponse = response.json().await.map_err(DeployError::Other)?;
        if let Some(problem) = &reply.error {
            warn!(
                error = %problem,
                details = reply.details.as_deref().unwrap_or_default(),
                "deployment service reported a problem"
            );
        }

        Ok(reply
            .response
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> DeployError {
        if err.is_timeout() {
            DeployError::Timeout(self.settings.deploy_timeout)
        } else if err.is_connect() || err.is_request() {
            DeployError::Network(err)
        } else {
            DeployError::Other(err)
        }
    }

    fn fail(
        &self,
        err: DeployError,
        config: Option<DeploymentConfig>,
        warnings: Vec<String>,
    ) -> DeployOutcome {
        error!(error = %err, "deployment failed");
        let state = self.report(DeploymentStatus::Error, err.to_string());

        let probe = err.is_deploy_stage().then(|| {
            spawn_probe(
                self.client.clone(),
                self.endpoints.health.clone(),
                self.settings.health_timeout,
            )
        });

        DeployOutcome {
            state,
            config,
            published_url: None,
            error: Some(err),
            warnings,
            probe,
        }
    }

    fn report(&self, status: DeploymentStatus, message: impl Into<String>) -> DeploymentState {
        let state = DeploymentState::new(status, message);
        info!(status = ?state.status, message = %state.message, "deployment status");
        self.status.send_replace(state.clone());
        state
    }
}
