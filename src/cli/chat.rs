//! Line-oriented chat REPL.

use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;

use crate::commands::{process_input, CommandContext, CommandResult};
use crate::core::chat::{ChatEvent, ChatSession, SubmitOutcome};
use crate::core::history::load_history;
use crate::core::server_url::SharedServerUrl;
use crate::utils::logging::LoggingState;

#[derive(Debug, Default)]
pub struct ChatOptions {
    pub history: Option<PathBuf>,
    pub log: Option<String>,
    pub stream_idle_timeout: Option<Duration>,
}

/// Writes chat events to a terminal: reply text to `out`, failures to `err`.
pub struct ReplyPrinter<O: Write, E: Write> {
    out: O,
    err: E,
    mid_line: bool,
}

impl ReplyPrinter<io::Stdout, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> ReplyPrinter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            mid_line: false,
        }
    }

    pub fn handle(&mut self, event: &ChatEvent) -> io::Result<()> {
        match event {
            ChatEvent::Appended(message) if message.role.is_user() => {}
            ChatEvent::Appended(message) if message.is_error() => {
                self.break_line()?;
                writeln!(self.err, "❌ {}", message.content)?;
                self.err.flush()?;
            }
            ChatEvent::Appended(message) => self.write_text(&message.content)?,
            ChatEvent::Chunk(chunk) => self.write_text(chunk)?,
            ChatEvent::Finished => self.break_line()?,
        }
        self.out.flush()
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        write!(self.out, "{text}")?;
        self.mid_line = !text.ends_with('\n');
        Ok(())
    }

    fn break_line(&mut self) -> io::Result<()> {
        if self.mid_line {
            writeln!(self.out)?;
            self.mid_line = false;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }
}

/// Submit `input`, rendering events while the request is in flight.
pub(crate) async fn submit_and_print<O: Write, E: Write>(
    session: &mut ChatSession,
    events: &mut UnboundedReceiver<ChatEvent>,
    printer: &mut ReplyPrinter<O, E>,
    input: &str,
) -> io::Result<SubmitOutcome> {
    let outcome = {
        let submit = session.submit(input);
        tokio::pin!(submit);
        loop {
            tokio::select! {
                outcome = &mut submit => break outcome,
                Some(event) = events.recv() => printer.handle(&event)?,
            }
        }
    };

    while let Ok(event) = events.try_recv() {
        printer.handle(&event)?;
    }
    Ok(outcome)
}

pub async fn run_chat(
    client: reqwest::Client,
    server_url: SharedServerUrl,
    options: ChatOptions,
) -> Result<(), Box<dyn Error>> {
    let mut session =
        ChatSession::new(client, server_url).with_stream_idle_timeout(options.stream_idle_timeout);
    let mut logging = LoggingState::new(options.log)?;

    if let Some(path) = &options.history {
        let messages = load_history(path)?;
        println!("Restored {} messages from {}", messages.len(), path.display());
        session.replace_history(messages);
        logging.rewrite_log(session.messages())?;
    }

    println!(
        "Chatting with {} (type /help for commands, /quit to leave)",
        session.server_url().current()
    );

    let mut events = session.subscribe();
    let mut printer = ReplyPrinter::stdio();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        let mut ctx = CommandContext {
            session: &mut session,
            logging: &mut logging,
        };
        let text = match process_input(&mut ctx, &line) {
            CommandResult::Continue => continue,
            CommandResult::Status(message) => {
                println!("{message}");
                continue;
            }
            CommandResult::Error(message) => {
                eprintln!("⚠️  {message}");
                continue;
            }
            CommandResult::Quit => break,
            CommandResult::ProcessAsMessage(text) => text,
        };

        let before = session.messages().len();
        submit_and_print(&mut session, &mut events, &mut printer, &text).await?;

        for message in &session.messages()[before..] {
            if let Err(err) = logging.log_message(message) {
                warn!(error = %err, "failed to write chat log");
                eprintln!("⚠️  Log error: {err}");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::BACKEND_UNAVAILABLE_MESSAGE;
    use crate::core::message::ChatMessage;
    use crate::utils::test_utils::{CannedResponse, MockServer};

    fn render(events: &[ChatEvent]) -> (String, String) {
        let mut printer = ReplyPrinter::new(Vec::new(), Vec::new());
        for event in events {
            printer.handle(event).expect("write to memory");
        }
        let (out, err) = printer.into_parts();
        (
            String::from_utf8(out).expect("utf8"),
            String::from_utf8(err).expect("utf8"),
        )
    }

    #[test]
    fn streamed_chunks_end_with_one_newline() {
        let (out, err) = render(&[
            ChatEvent::Appended(ChatMessage::user("hi")),
            ChatEvent::Appended(ChatMessage::assistant("")),
            ChatEvent::Chunk("Hel".to_string()),
            ChatEvent::Chunk("lo".to_string()),
            ChatEvent::Finished,
        ]);

        assert_eq!(out, "Hello\n");
        assert!(err.is_empty());
    }

    #[test]
    fn errors_go_to_stderr_after_partial_output() {
        let (out, err) = render(&[
            ChatEvent::Appended(ChatMessage::assistant("")),
            ChatEvent::Chunk("part".to_string()),
            ChatEvent::Appended(ChatMessage::assistant_error(BACKEND_UNAVAILABLE_MESSAGE)),
            ChatEvent::Finished,
        ]);

        assert_eq!(out, "part\n");
        assert_eq!(err, format!("❌ {BACKEND_UNAVAILABLE_MESSAGE}\n"));
    }

    #[tokio::test]
    async fn submit_and_print_renders_streamed_reply() {
        let server = MockServer::start(vec![(
            "/stream",
            CannedResponse::chunked(
                vec![b"one ".to_vec(), b"two".to_vec()],
                Duration::from_millis(10),
            ),
        )])
        .await;
        let mut session = ChatSession::new(
            reqwest::Client::new(),
            SharedServerUrl::new(server.url("/stream")),
        );
        let mut events = session.subscribe();
        let mut printer = ReplyPrinter::new(Vec::new(), Vec::new());

        let outcome = submit_and_print(&mut session, &mut events, &mut printer, "count")
            .await
            .expect("render");

        assert!(matches!(outcome, SubmitOutcome::Replied));
        let (out, _) = printer.into_parts();
        assert_eq!(String::from_utf8(out).expect("utf8"), "one two\n");
    }
}
