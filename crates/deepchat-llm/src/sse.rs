//! Line framing for server-sent-event bodies.
//!
//! The response body arrives as arbitrary byte chunks. [`lines`] turns it into
//! a stream of text lines split on `\n`, with a trailing `\r` removed. A final
//! line without a terminator is still yielded when the body ends. Decoding is
//! done per line, so a multi-byte character split across chunks survives.

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};

use crate::error::{LlmError, Result};

/// A stream of text lines from a response body.
pub type LineStream = Pin<Box<dyn Stream<Item = Result<String>> + Send + 'static>>;

/// Frame a byte stream into lines.
///
/// A read error is yielded once as [`LlmError::Network`] and ends the stream.
pub fn lines<S, E>(byte_stream: S) -> LineStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(futures::stream::unfold(
        LineState {
            byte_stream: Box::pin(byte_stream),
            buffer: Vec::new(),
            start: 0,
            scanned: 0,
            done: false,
        },
        |mut state| async move {
            if state.done {
                return None;
            }

            loop {
                if let Some(line) = state.next_line() {
                    return Some((Ok(line), state));
                }

                match state.byte_stream.next().await {
                    Some(Ok(bytes)) => state.refill(&bytes),
                    Some(Err(e)) => {
                        state.done = true;
                        return Some((Err(LlmError::Network(e.to_string())), state));
                    }
                    None => {
                        state.done = true;
                        let rest = &state.buffer[state.start..];
                        if rest.is_empty() {
                            return None;
                        }
                        let line = decode_line(rest);
                        return Some((Ok(line), state));
                    }
                }
            }
        },
    ))
}

/// Build a line stream from already-framed lines.
pub fn from_lines<I>(lines: I) -> LineStream
where
    I: IntoIterator<Item = String>,
    I::IntoIter: Send + 'static,
{
    Box::pin(futures::stream::iter(lines.into_iter().map(Ok)))
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

struct LineState<E> {
    byte_stream: Pin<Box<dyn Stream<Item = std::result::Result<Bytes, E>> + Send>>,
    buffer: Vec<u8>,
    /// Start of the first unconsumed line in `buffer`.
    start: usize,
    /// Bytes before this offset hold no `\n` past `start`.
    scanned: usize,
    done: bool,
}

impl<E> LineState<E> {
    fn next_line(&mut self) -> Option<String> {
        match self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let end = self.scanned + offset;
                let line = decode_line(&self.buffer[self.start..end]);
                self.start = end + 1;
                self.scanned = self.start;
                Some(line)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }

    /// Drop consumed lines, then append `bytes`.
    fn refill(&mut self, bytes: &[u8]) {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
        self.buffer.extend_from_slice(bytes);
    }
}
