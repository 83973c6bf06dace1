use futures_util::{Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::chat::ChatError;

/// Incremental UTF-8 decoder for response bodies.
///
/// Chunk boundaries are arbitrary, so a multi-byte character may arrive split
/// across two reads. The incomplete tail is held back until the next chunk;
/// genuinely invalid bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let mut out = String::new();

        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    break;
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match err.error_len() {
                        None => {
                            self.pending.drain(..valid);
                            break;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}

/// Drain a raw text body, reporting every decoded fragment to `on_chunk`.
///
/// Fragments are not framed in any way; the returned string is their plain
/// concatenation. With `idle_timeout` set, a read that produces nothing
/// within the bound abandons the stream.
pub async fn read_text_stream<S, B, F>(
    mut stream: S,
    idle_timeout: Option<Duration>,
    mut on_chunk: F,
) -> Result<String, ChatError>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
    B: AsRef<[u8]>,
    F: FnMut(&str),
{
    let mut decoder = Utf8ChunkDecoder::new();
    let mut buffer = String::new();
    let mut chunks = 0usize;

    loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!(?limit, chunks, "stream stalled, giving up");
                    return Err(ChatError::StreamIdle(limit));
                }
            },
            None => stream.next().await,
        };

        let Some(chunk) = next else {
            break;
        };

        let text = decoder.decode(chunk?.as_ref());
        chunks += 1;
        if !text.is_empty() {
            buffer.push_str(&text);
            on_chunk(&text);
        }
    }

    let rest = decoder.finish();
    if !rest.is_empty() {
        buffer.push_str(&rest);
        on_chunk(&rest);
    }

    debug!(chunks, bytes = buffer.len(), "stream finished");
    Ok(buffer)
}
