//! Persistent conversation history for deepchat.
//!
//! This crate provides:
//! - [`TranscriptStore`]: the whole history file, loaded once, mutated in memory
//!   behind a single lock and written back in full
//! - Session helpers that pick the conversation ID for a run and append turns
//! - Age-based and ID-based removal of conversations
//!
//! # Example
//!
//! ```rust,ignore
//! use deepchat_history::{TranscriptStore, session};
//!
//! let store = TranscriptStore::open("/home/me/.deepseek_history.json");
//! let id = session::resolve_conversation_id(None, false, store.last_id().as_deref());
//! let conversation = session::start_turn(&store, &id, "hello", "Be concise.")?;
//! // ... stream the reply ...
//! session::finish_turn(&store, &id, "Hi!")?;
//! store.save()?;
//! ```

mod error;
mod ids;
mod retention;
pub mod session;
mod store;
mod types;

pub use error::{HistoryError, Result};
pub use ids::{CHAT_ID_BYTES, generate_chat_id};
pub use retention::{RemovalOutcome, parse_age};
pub use store::TranscriptStore;
pub use types::{Conversation, History};
