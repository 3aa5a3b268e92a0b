//! Error types for history operations.

use std::path::{Path, PathBuf};

/// Error type for history operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Filesystem failure while reading or writing the history file.
    #[error("{context} '{}': {source}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    /// The history file exists but is not valid JSON of the expected shape.
    #[error("failed to parse history file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The in-memory history could not be serialized.
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A user turn was requested with no prompt text.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// No conversation with this ID exists.
    #[error("conversation not found: {0}")]
    NotFound(String),

    /// Input is not a relative age.
    #[error("invalid age '{input}': {reason}")]
    InvalidAge { input: String, reason: String },
}

impl HistoryError {
    pub(crate) fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_age(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAge {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
