//! Chat backend trait and a scripted mock for tests.

use async_trait::async_trait;
use deepchat_types::Message;

use crate::error::Result;
use crate::sse::LineStream;
use crate::types::ModelList;

// ─────────────────────────────────────────────────────────────────────────────
// Chat Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A provider that can stream a chat completion.
///
/// `stream_chat` only opens the stream and frames it into lines; interpreting
/// the lines is left to [`crate::StreamReassembler`].
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the full transcript and return the response body as lines.
    ///
    /// A non-success status is returned as [`crate::LlmError::Api`] before any
    /// line is produced.
    async fn stream_chat(&self, model: &str, messages: &[Message]) -> Result<LineStream>;

    /// List the models available to the configured credential.
    async fn list_models(&self) -> Result<ModelList>;

    /// Get the name of this backend.
    fn name(&self) -> &str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(any(test, feature = "testing"))]
pub use mock::{MockBackend, MockResponse, RecordedRequest, delta_line};

#[cfg(any(test, feature = "testing"))]
mod mock {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use deepchat_types::Message;
    use parking_lot::Mutex;

    use super::ChatBackend;
    use crate::error::{LlmError, Result};
    use crate::sse::{LineStream, from_lines};
    use crate::types::{ModelInfo, ModelList};

    /// Format a content fragment as a stream line.
    pub fn delta_line(content: &str) -> String {
        format!(
            "data: {}",
            serde_json::json!({"choices": [{"index": 0, "delta": {"content": content}}]})
        )
    }

    /// One scripted reply.
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Raw stream lines, returned verbatim.
        Lines(Vec<String>),
        /// A non-success HTTP status.
        Api { status: u16, body: String },
    }

    impl MockResponse {
        /// A well-formed stream of `fragments` followed by the sentinel.
        pub fn fragments(fragments: &[&str]) -> Self {
            let mut lines: Vec<String> = fragments.iter().map(|f| delta_line(f)).collect();
            lines.push("data: [DONE]".to_string());
            Self::Lines(lines)
        }
    }

    /// A request the mock received.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedRequest {
        pub model: String,
        pub messages: Vec<Message>,
    }

    /// A mock backend for testing purposes.
    ///
    /// Returns pre-configured responses in order and records every request.
    #[derive(Debug)]
    pub struct MockBackend {
        name: String,
        responses: Mutex<VecDeque<MockResponse>>,
        models: Vec<String>,
        request_log: Mutex<Vec<RecordedRequest>>,
    }

    impl MockBackend {
        pub fn new(responses: Vec<MockResponse>) -> Self {
            Self {
                name: "mock".to_string(),
                responses: Mutex::new(responses.into()),
                models: vec!["deepseek-chat".to_string(), "deepseek-reasoner".to_string()],
                request_log: Mutex::new(Vec::new()),
            }
        }

        /// A mock that streams `text` as a single fragment.
        pub fn with_text(text: &str) -> Self {
            Self::new(vec![MockResponse::fragments(&[text])])
        }

        pub fn with_models(mut self, models: &[&str]) -> Self {
            self.models = models.iter().map(|m| m.to_string()).collect();
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.request_log.lock().clone()
        }

        pub fn request_count(&self) -> usize {
            self.request_log.lock().len()
        }
    }

    #[async_trait]
    impl ChatBackend for MockBackend {
        async fn stream_chat(&self, model: &str, messages: &[Message]) -> Result<LineStream> {
            self.request_log.lock().push(RecordedRequest {
                model: model.to_string(),
                messages: messages.to_vec(),
            });

            match self.responses.lock().pop_front() {
                Some(MockResponse::Lines(lines)) => Ok(from_lines(lines)),
                Some(MockResponse::Api { status, body }) => Err(LlmError::Api { status, body }),
                None => Err(LlmError::Internal(
                    "MockBackend: no more responses available".to_string(),
                )),
            }
        }

        async fn list_models(&self) -> Result<ModelList> {
            Ok(ModelList {
                data: self
                    .models
                    .iter()
                    .map(|id| ModelInfo {
                        id: id.clone(),
                        owned_by: Some("mock".to_string()),
                    })
                    .collect(),
            })
        }

        fn name(&self) -> &str {
            &self.name
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_mock_backend_stream() {
        let backend = MockBackend::new(vec![MockResponse::fragments(&["Hel", "lo"])]);
        let lines: Vec<String> = backend
            .stream_chat("deepseek-chat", &[Message::user("Hi")])
            .await
            .unwrap()
            .map(|l| l.unwrap())
            .collect()
            .await;

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "data: [DONE]");
        assert_eq!(backend.request_count(), 1);
        assert_eq!(backend.requests()[0].model, "deepseek-chat");
    }

    #[tokio::test]
    async fn test_mock_backend_exhausted() {
        let backend = MockBackend::new(vec![]);
        let result = backend.stream_chat("m", &[]).await;
        assert!(matches!(result, Err(LlmError::Internal(_))));
    }

    #[tokio::test]
    async fn test_mock_backend_api_error() {
        let backend = MockBackend::new(vec![MockResponse::Api {
            status: 402,
            body: "Insufficient Balance".to_string(),
        }]);
        let err = backend.stream_chat("m", &[]).await.err().unwrap();
        assert_eq!(err.status(), Some(402));
    }

    #[tokio::test]
    async fn test_mock_backend_models() {
        let backend = MockBackend::new(vec![]).with_models(&["a", "b"]);
        let models = backend.list_models().await.unwrap();
        assert_eq!(models.ids().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
