//! The transcript store.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use crate::error::{HistoryError, Result};
use crate::retention::{RemovalOutcome, parse_age};
use crate::types::{Conversation, History};

/// Process-wide conversation history backed by one JSON file.
///
/// The file is read once by [`TranscriptStore::open`], mutated in memory, and
/// written back in full by [`TranscriptStore::save`]. Every operation holds the
/// single internal lock for its duration. Nothing coordinates with other
/// processes: the last save wins.
pub struct TranscriptStore {
    path: PathBuf,
    state: Mutex<History>,
}

impl TranscriptStore {
    /// Load the history file at `path`.
    ///
    /// Fails soft: a missing file gives an empty store, and an unreadable or
    /// corrupt file is logged and also gives an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let history = match read_history(&path) {
            Ok(Some(history)) => {
                debug!(
                    path = %path.display(),
                    conversations = history.history.len(),
                    "History loaded"
                );
                history
            }
            Ok(None) => {
                debug!(path = %path.display(), "No history file, starting empty");
                History::default()
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable history file, starting empty");
                History::default()
            }
        };

        Self::with_history(path, history)
    }

    /// Create a store over an in-memory history without touching the disk.
    pub fn with_history(path: impl Into<PathBuf>, history: History) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(history),
        }
    }

    /// Write the whole history to disk, owner read/write only.
    ///
    /// The data goes to a sibling temp file which is then renamed over the
    /// target, so the file is either the old or the new version.
    pub fn save(&self) -> Result<()> {
        let state = self.state.lock();
        let data = serde_json::to_vec_pretty(&*state)?;
        write_private(&self.path, &data)?;
        debug!(
            path = %self.path.display(),
            conversations = state.history.len(),
            bytes = data.len(),
            "History saved"
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.state.lock().history.get(id).cloned()
    }

    pub fn put(&self, id: impl Into<String>, conversation: Conversation) {
        let id = id.into();
        trace!(chat_id = %id, messages = conversation.messages.len(), "Storing conversation");
        self.state.lock().history.insert(id, conversation);
    }

    pub fn delete(&self, id: &str) -> Option<Conversation> {
        self.state.lock().history.remove(id)
    }

    /// All conversations, newest first (ties broken by ID).
    pub fn list(&self) -> Vec<(String, Conversation)> {
        let state = self.state.lock();
        let mut entries: Vec<(String, Conversation)> = state
            .history
            .iter()
            .map(|(id, conv)| (id.clone(), conv.clone()))
            .collect();
        entries.sort_by(|(a_id, a), (b_id, b)| {
            b.created_at.cmp(&a.created_at).then_with(|| a_id.cmp(b_id))
        });
        entries
    }

    pub fn len(&self) -> usize {
        self.state.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().history.is_empty()
    }

    /// The most recently used conversation ID, if any.
    pub fn last_id(&self) -> Option<String> {
        let state = self.state.lock();
        (!state.last_chat_id.is_empty()).then(|| state.last_chat_id.clone())
    }

    pub fn set_last_id(&self, id: impl Into<String>) {
        self.state.lock().last_chat_id = id.into();
    }

    /// A copy of the in-memory history.
    pub fn snapshot(&self) -> History {
        self.state.lock().clone()
    }

    /// Remove by relative age (`10d`, `72 hours`) or, failing that, by literal ID.
    ///
    /// Age-based removal deletes every conversation created before
    /// `now - age`. An ID that does not exist is [`HistoryError::NotFound`] and
    /// leaves the store unchanged.
    pub fn remove(&self, criteria: &str) -> Result<RemovalOutcome> {
        if let Ok(age) = parse_age(criteria) {
            let cutoff = Utc::now()
                .checked_sub_signed(age)
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            let removed = self.remove_older_than(cutoff);
            return Ok(RemovalOutcome::Expired { cutoff, removed });
        }

        match self.delete(criteria) {
            Some(_) => {
                info!(chat_id = %criteria, "Conversation removed");
                Ok(RemovalOutcome::Removed {
                    id: criteria.to_string(),
                })
            }
            None => Err(HistoryError::NotFound(criteria.to_string())),
        }
    }

    /// Delete every conversation created strictly before `cutoff`; returns their IDs.
    pub fn remove_older_than(&self, cutoff: DateTime<Utc>) -> Vec<String> {
        let mut state = self.state.lock();
        let expired: Vec<String> = state
            .history
            .iter()
            .filter(|(_, conv)| conv.created_at < cutoff)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            state.history.remove(id);
            info!(chat_id = %id, cutoff = %cutoff, "Conversation removed due to age");
        }

        expired
    }
}

/// Read and parse the history file. `Ok(None)` when it does not exist.
fn read_history(path: &Path) -> Result<Option<History>> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HistoryError::io("reading history file", path, e)),
    };

    serde_json::from_slice(&data)
        .map(Some)
        .map_err(|source| HistoryError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| HistoryError::io("creating history directory", parent, e))?;
    }

    let tmp = temp_path(path);
    let written = open_private(&tmp).and_then(|mut file| {
        file.write_all(data)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(HistoryError::io("writing history file", &tmp, e));
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        HistoryError::io("replacing history file", path, e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history.json".to_string());
    path.with_file_name(format!("{}.tmp", name))
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // A stale temp file keeps its old mode; force it.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
