//! One-shot "say" command

use std::error::Error;
use std::time::Duration;

use crate::cli::chat::{submit_and_print, ReplyPrinter};
use crate::core::chat::{ChatSession, SubmitOutcome};
use crate::core::server_url::SharedServerUrl;

pub async fn run_say(
    prompt: Vec<String>,
    client: reqwest::Client,
    server_url: SharedServerUrl,
    stream_idle_timeout: Option<Duration>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: modeldeck say <prompt>");
        std::process::exit(1);
    }

    let mut session =
        ChatSession::new(client, server_url).with_stream_idle_timeout(stream_idle_timeout);
    let mut events = session.subscribe();
    let mut printer = ReplyPrinter::stdio();

    let outcome = submit_and_print(&mut session, &mut events, &mut printer, &prompt).await?;
    if let SubmitOutcome::Failed(err) = outcome {
        tracing::debug!(error = %err, "say failed");
        std::process::exit(1);
    }

    Ok(())
}
