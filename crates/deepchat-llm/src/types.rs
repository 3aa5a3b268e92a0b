//! Wire types for the chat-completion, model-listing and status endpoints.

use deepchat_types::Message;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Chat Completions
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub stream: bool,
}

impl<'a> ChatRequest<'a> {
    /// A streaming request over the full transcript.
    pub fn streaming(model: &'a str, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            stream: true,
        }
    }
}

/// One `data:` payload of the completion stream.
///
/// Only the fields the reassembler reads are modelled; everything else the
/// server sends is ignored.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Option<StreamDelta>,
}

#[derive(Debug, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    /// Text carried by the first choice; empty when the delta has none.
    ///
    /// `None` when the chunk has no choices at all.
    pub fn first_content(&self) -> Option<&str> {
        let choice = self.choices.first()?;
        Some(
            choice
                .delta
                .as_ref()
                .and_then(|d| d.content.as_deref())
                .unwrap_or(""),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────────────────────────────────────

/// Response body of `GET /models`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

impl ModelList {
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|m| m.id.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Service Status
// ─────────────────────────────────────────────────────────────────────────────

/// Response body of the status page's `status.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusPage {
    pub status: ServiceStatus,
}

/// Overall service health as reported by the status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// `none`, `minor`, `major` or `critical`.
    pub indicator: String,
    pub description: String,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.indicator, self.description)
    }
}
