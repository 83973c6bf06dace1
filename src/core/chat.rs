//! Chat request dispatcher.
//!
//! A [`ChatSession`] owns the conversation history. Each submission appends
//! the user's message, serializes the whole history into a transcript prompt
//! and posts it to the current server URL. The URL suffix decides whether the
//! reply is read as one JSON object or as a raw text stream.

use std::ops::{Deref, DerefMut};
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::{QueryMode, QueryRequest, QueryResponse};
use crate::core::chat_stream::read_text_stream;
use crate::core::message::{serialize_transcript, ChatMessage};
use crate::core::server_url::SharedServerUrl;

pub const BACKEND_UNAVAILABLE_MESSAGE: &str = "Error: Unable to get a response from the backend.";
pub const PROCESSING_FAILED_MESSAGE: &str = "Error: Failed to process the response.";
pub const MISSING_TEXT_MESSAGE: &str =
    "Error: The backend response did not include generated text.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("backend response did not include generated text")]
    MissingText,
    #[error("no data received from the stream for {0:?}")]
    StreamIdle(Duration),
}

impl ChatError {
    /// Text shown in the error-flagged assistant message.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::Status { .. } => BACKEND_UNAVAILABLE_MESSAGE,
            ChatError::MissingText => MISSING_TEXT_MESSAGE,
            ChatError::Transport(_) | ChatError::StreamIdle(_) => PROCESSING_FAILED_MESSAGE,
        }
    }
}

/// Progress notifications for whoever renders the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A message was pushed onto the history.
    Appended(ChatMessage),
    /// Text was appended to the last (streaming) message.
    Chunk(String),
    /// The request finished and the session is no longer loading.
    Finished,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank input; nothing was sent.
    Ignored,
    Replied,
    Failed(ChatError),
}

pub struct ChatSession {
    client: reqwest::Client,
    server_url: SharedServerUrl,
    messages: Vec<ChatMessage>,
    loading: bool,
    stream_idle_timeout: Option<Duration>,
    events: Option<mpsc::UnboundedSender<ChatEvent>>,
}

impl ChatSession {
    pub fn new(client: reqwest::Client, server_url: SharedServerUrl) -> Self {
        Self {
            client,
            server_url,
            messages: Vec::new(),
            loading: false,
            stream_idle_timeout: None,
            events: None,
        }
    }

    pub fn with_stream_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    /// Create the event channel. Replaces any previous subscriber.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<ChatEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn server_url(&self) -> &SharedServerUrl {
        &self.server_url
    }

    /// Swap in a previously saved history.
    pub fn replace_history(&mut self, messages: Vec<ChatMessage>) {
        self.messages = messages;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Send `input` as the next user turn and record the reply.
    ///
    /// Failures never escape: they end up as an error-flagged assistant
    /// message and are also returned for callers that care.
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let content = input.trim();
        if content.is_empty() {
            return SubmitOutcome::Ignored;
        }

        self.push(ChatMessage::user(content));

        let url = self.server_url.current();
        let mode = QueryMode::for_url(&url);
        let prompt = serialize_transcript(&self.messages);

        let mut request = InFlight::start(self);
        let result = request.dispatch(&url, mode, prompt).await;
        let outcome = match result {
            Ok(()) => SubmitOutcome::Replied,
            Err(err) => {
                warn!(server_url = %url, error = %err, "chat request failed");
                request.push(ChatMessage::assistant_error(err.user_message()));
                SubmitOutcome::Failed(err)
            }
        };
        request.settled = true;

        outcome
    }

    async fn dispatch(&mut self, url: &str, mode: QueryMode, prompt: String) -> Result<(), ChatError> {
        let request = QueryRequest::new(prompt, mode);
        debug!(server_url = %url, ?mode, prompt_len = request.prompt.len(), "dispatching chat request");

        let response = self.client.post(url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ChatError::Status { status, body });
        }

        match mode {
            QueryMode::Batch => {
                let parsed: QueryResponse = response.json().await?;
                let text = parsed.first_text().ok_or(ChatError::MissingText)?;
                info!(chars = text.len(), "received batch reply");
                self.push(ChatMessage::assistant(text));
            }
            QueryMode::Stream => {
                self.push(ChatMessage::assistant(String::new()));

                let events = self.events.clone();
                let messages = &mut self.messages;
                let streamed = read_text_stream(
                    response.bytes_stream(),
                    self.stream_idle_timeout,
                    |chunk| {
                        if let Some(last) = messages.last_mut() {
                            last.content.push_str(chunk);
                        }
                        if let Some(tx) = &events {
                            let _ = tx.send(ChatEvent::Chunk(chunk.to_string()));
                        }
                    },
                )
                .await?;
                info!(chars = streamed.len(), "received streamed reply");
            }
        }

        Ok(())
    }

    fn push(&mut self, message: ChatMessage) {
        self.emit(ChatEvent::Appended(message.clone()));
        self.messages.push(message);
    }

    fn emit(&self, event: ChatEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

/// Holds the session while a request is in flight. Dropping it clears the
/// loading flag; if the request never settled (the submit future was
/// dropped) the reply is closed off with an error message first.
struct InFlight<'a> {
    session: &'a mut ChatSession,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn start(session: &'a mut ChatSession) -> Self {
        session.loading = true;
        Self {
            session,
            settled: false,
        }
    }
}

impl Deref for InFlight<'_> {
    type Target = ChatSession;

    fn deref(&self) -> &ChatSession {
        self.session
    }
}

impl DerefMut for InFlight<'_> {
    fn deref_mut(&mut self) -> &mut ChatSession {
        self.session
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("chat request cancelled before it finished");
            self.session
                .push(ChatMessage::assistant_error(PROCESSING_FAILED_MESSAGE));
        }
        self.session.loading = false;
        self.session.emit(ChatEvent::Finished);
    }
}
