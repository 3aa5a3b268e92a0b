//! Streaming chat-completion client for deepchat.
//!
//! ```text
//! ┌──────────────┐  lines   ┌───────────────────┐  fragments  ┌──────┐
//! │ ChatBackend  │ ───────▶ │ StreamReassembler │ ──────────▶ │ sink │
//! │ (DeepSeek)   │          └───────────────────┘             └──────┘
//! └──────────────┘                   │
//!                                    ▼
//!                               Completion
//! ```
//!
//! The backend opens the request and frames the body into lines
//! ([`sse::lines`]). The reassembler interprets the `data:` lines, echoes each
//! content fragment as it arrives and returns the full reply.

pub mod backend;
pub mod client;
pub mod error;
pub mod reassembler;
pub mod sse;
pub mod status;
pub mod types;

pub use backend::ChatBackend;
#[cfg(any(test, feature = "testing"))]
pub use backend::{MockBackend, MockResponse, RecordedRequest, delta_line};
pub use client::{DeepSeekClient, DeepSeekConfig};
pub use error::{LlmError, Result};
pub use reassembler::{Completion, DONE_SENTINEL, Finish, LineEvent, StreamReassembler};
pub use sse::LineStream;
pub use status::fetch_service_status;
pub use types::{ModelInfo, ModelList, ServiceStatus};
