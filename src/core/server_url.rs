//! Shared chat target.
//!
//! The deploy orchestrator and the chat session do not know about each other.
//! Both are handed a clone of [`SharedServerUrl`]; a successful deployment
//! publishes the new query URL and the chat session reads the current value
//! whenever it dispatches a request. The last published value wins.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Clone, Debug)]
pub struct SharedServerUrl {
    tx: Arc<watch::Sender<String>>,
}

impl SharedServerUrl {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self { tx: Arc::new(tx) }
    }

    /// The URL requests should currently be sent to.
    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Replace the chat target. Returns the previous URL.
    pub fn publish(&self, url: impl Into<String>) -> String {
        let url = url.into();
        info!(server_url = %url, "chat server url changed");
        self.tx.send_replace(url)
    }

    /// Receive a notification every time a new URL is published.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}
