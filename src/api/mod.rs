//! Wire payloads exchanged with the inference backend and the deployment
//! service.

use serde::{Deserialize, Serialize};

pub const MAX_LENGTH: u32 = 1024;
pub const TOP_P: f32 = 0.5;

/// How the chat endpoint delivers its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// One JSON object with `generated_text`.
    Batch,
    /// Raw chunked text body.
    Stream,
}

impl QueryMode {
    pub fn for_url(url: &str) -> Self {
        if crate::utils::url::is_streaming_url(url) {
            QueryMode::Stream
        } else {
            QueryMode::Batch
        }
    }

    pub fn is_stream(self) -> bool {
        self == QueryMode::Stream
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRequest {
    pub prompt: String,
    pub max_length: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_return_sequences: Option<u32>,
}

impl QueryRequest {
    /// Build the request body with the sampling parameters for `mode`.
    pub fn new(prompt: impl Into<String>, mode: QueryMode) -> Self {
        let (temperature, top_k, num_return_sequences) = match mode {
            QueryMode::Stream => (0.2, 25, None),
            QueryMode::Batch => (0.5, 50, Some(1)),
        };

        Self {
            prompt: prompt.into(),
            max_length: MAX_LENGTH,
            temperature,
            top_p: TOP_P,
            top_k,
            num_return_sequences,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub generated_text: Option<Vec<String>>,
}

impl QueryResponse {
    /// The first generated sequence, if the backend returned any.
    pub fn first_text(self) -> Option<String> {
        self.generated_text?.into_iter().next()
    }
}

/// Reply from either upload endpoint. The success payload carries
/// `key_path` (SSH key) or `file_path` (model file).
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    #[serde(default)]
    pub key_path: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeployResponse {
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}
