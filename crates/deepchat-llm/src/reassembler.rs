//! Rebuilding the assistant reply from the completion stream.

use std::io::Write;

use futures::{Stream, StreamExt};
use tracing::{debug, trace, warn};

use crate::error::Result;
use crate::types::StreamChunk;

/// Payload that ends a successful stream.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data: ";

/// How a stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    /// The server sent the `[DONE]` sentinel.
    Done,
    /// The body closed without the sentinel; the text may be incomplete.
    Truncated,
}

/// The reassembled assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub finish: Finish,
}

impl Completion {
    pub fn is_truncated(&self) -> bool {
        self.finish == Finish::Truncated
    }
}

/// What a single stream line amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Blank, not a `data:` line, malformed JSON, or no choices.
    Skipped,
    /// A content fragment (possibly empty).
    Fragment(String),
    /// The end-of-stream sentinel.
    Done,
}

/// Accumulates content fragments from a completion stream.
#[derive(Debug, Default)]
pub struct StreamReassembler {
    text: String,
    fragments: usize,
    done: bool,
}

impl StreamReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret one line and fold any fragment into the accumulated text.
    pub fn push_line(&mut self, line: &str) -> LineEvent {
        let event = classify_line(line);
        match &event {
            LineEvent::Fragment(content) => {
                self.text.push_str(content);
                self.fragments += 1;
            }
            LineEvent::Done => self.done = true,
            LineEvent::Skipped => {}
        }
        event
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn finish(self) -> Completion {
        Completion {
            text: self.text,
            finish: if self.done {
                Finish::Done
            } else {
                Finish::Truncated
            },
        }
    }

    /// Consume `lines` until the sentinel or end of stream, echoing each
    /// fragment to `sink` as it arrives.
    ///
    /// Lines after the sentinel are never read. A transport error from the
    /// stream is returned as is and the partial text is dropped. A failing
    /// sink stops the echo but not the accumulation.
    pub async fn reassemble<S, W>(lines: S, sink: &mut W) -> Result<Completion>
    where
        S: Stream<Item = Result<String>> + Unpin,
        W: Write + ?Sized,
    {
        let mut lines = lines;
        let mut reassembler = Self::new();
        let mut echo = true;

        while let Some(line) = lines.next().await {
            let line = line?;
            trace!(line = %line, "Raw stream line");

            match reassembler.push_line(&line) {
                LineEvent::Fragment(content) => {
                    if echo
                        && let Err(e) = sink
                            .write_all(content.as_bytes())
                            .and_then(|_| sink.flush())
                    {
                        warn!(error = %e, "Failed to echo stream output, continuing silently");
                        echo = false;
                    }
                }
                LineEvent::Done => {
                    debug!(fragments = reassembler.fragments, "Stream completed");
                    break;
                }
                LineEvent::Skipped => {}
            }
        }

        let completion = reassembler.finish();
        if completion.is_truncated() {
            warn!(
                chars = completion.text.len(),
                "Stream ended without the [DONE] sentinel"
            );
        }
        Ok(completion)
    }
}

fn classify_line(line: &str) -> LineEvent {
    if line.is_empty() {
        return LineEvent::Skipped;
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        trace!(line = %line, "Skipping non-data line");
        return LineEvent::Skipped;
    };

    if payload == DONE_SENTINEL {
        return LineEvent::Done;
    }

    match serde_json::from_str::<StreamChunk>(payload) {
        Ok(chunk) => match chunk.first_content() {
            Some(content) => LineEvent::Fragment(content.to_string()),
            None => {
                debug!("Stream chunk has no choices, skipping");
                LineEvent::Skipped
            }
        },
        Err(e) => {
            debug!(error = %e, payload = %payload, "Skipping malformed stream chunk");
            LineEvent::Skipped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::sse::from_lines;

    fn delta(content: &str) -> String {
        format!(
            "data: {}",
            serde_json::json!({"choices": [{"delta": {"content": content}}]})
        )
    }

    fn owned(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reassembles_fragments_in_order() {
        let lines = vec![delta("Hel"), delta("lo"), "data: [DONE]".to_string()];
        let mut sink = Vec::new();

        let completion = StreamReassembler::reassemble(from_lines(lines), &mut sink)
            .await
            .unwrap();
        assert_eq!(completion.text, "Hello");
        assert_eq!(completion.finish, Finish::Done);
        assert_eq!(sink, b"Hello");
    }

    #[tokio::test]
    async fn test_skips_noise() {
        let lines = vec![
            delta("ab"),
            String::new(),
            ": keep-alive".to_string(),
            "event: message".to_string(),
            "data:{\"choices\":[{\"delta\":{\"content\":\"no space\"}}]}".to_string(),
            "data: {not json".to_string(),
            "data: {\"choices\":[]}".to_string(),
            delta("cd"),
            "data: [DONE]".to_string(),
        ];
        let mut sink = Vec::new();

        let completion = StreamReassembler::reassemble(from_lines(lines), &mut sink)
            .await
            .unwrap();
        assert_eq!(completion.text, "abcd");
        assert_eq!(completion.finish, Finish::Done);
    }

    #[tokio::test]
    async fn test_stops_at_sentinel() {
        let lines = vec![delta("A"), "data: [DONE]".to_string(), delta("B")];
        let mut sink = Vec::new();

        let completion = StreamReassembler::reassemble(from_lines(lines), &mut sink)
            .await
            .unwrap();
        assert_eq!(completion.text, "A");
        assert_eq!(sink, b"A");
    }

    #[tokio::test]
    async fn test_missing_sentinel_is_truncated() {
        let mut sink = Vec::new();
        let completion = StreamReassembler::reassemble(from_lines(vec![delta("partial")]), &mut sink)
            .await
            .unwrap();
        assert_eq!(completion.text, "partial");
        assert!(completion.is_truncated());
    }

    #[tokio::test]
    async fn test_immediate_sentinel_is_empty_reply() {
        let mut sink = Vec::new();
        let completion =
            StreamReassembler::reassemble(from_lines(owned(&["data: [DONE]"])), &mut sink)
                .await
                .unwrap();
        assert_eq!(completion.text, "");
        assert_eq!(completion.finish, Finish::Done);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_returned() {
        let items: Vec<Result<String>> = vec![
            Ok(delta("half")),
            Err(LlmError::Network("connection reset".to_string())),
        ];
        let mut sink = Vec::new();

        let err = StreamReassembler::reassemble(futures::stream::iter(items), &mut sink)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Network(_)));
        assert_eq!(sink, b"half");
    }

    #[tokio::test]
    async fn test_broken_sink_still_accumulates() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let lines = vec![delta("a"), delta("b"), "data: [DONE]".to_string()];
        let completion = StreamReassembler::reassemble(from_lines(lines), &mut Broken)
            .await
            .unwrap();
        assert_eq!(completion.text, "ab");
    }

    #[test]
    fn test_push_line_events() {
        let mut r = StreamReassembler::new();
        assert_eq!(r.push_line(""), LineEvent::Skipped);
        assert_eq!(r.push_line(&delta("x")), LineEvent::Fragment("x".to_string()));
        assert_eq!(
            r.push_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            LineEvent::Fragment(String::new())
        );
        assert!(!r.is_done());
        assert_eq!(r.push_line("data: [DONE]"), LineEvent::Done);
        assert!(r.is_done());
        assert_eq!(r.text(), "x");
    }
}
