//! Conversation session: picking the conversation for a run and appending turns.

use tracing::debug;

use crate::error::{HistoryError, Result};
use crate::ids::generate_chat_id;
use crate::store::TranscriptStore;
use crate::types::Conversation;

/// Decide which conversation this invocation talks to.
///
/// | force_new | requested | last   | result          |
/// |-----------|-----------|--------|-----------------|
/// | true      | any       | any    | fresh ID        |
/// | false     | empty     | empty  | fresh ID        |
/// | false     | empty     | set    | `last`          |
/// | false     | set       | any    | `requested`     |
pub fn resolve_conversation_id(
    requested: Option<&str>,
    force_new: bool,
    last: Option<&str>,
) -> String {
    let requested = requested.filter(|s| !s.is_empty());
    let last = last.filter(|s| !s.is_empty());

    match (force_new, requested, last) {
        (false, Some(id), _) => id.to_string(),
        (false, None, Some(id)) => id.to_string(),
        _ => generate_chat_id(),
    }
}

/// Append a user message, creating the conversation if needed.
///
/// A new conversation is stamped with the current time and seeded with
/// `system_prompt`. An existing one keeps its original system message.
pub fn append_user_turn(
    existing: Option<Conversation>,
    prompt: &str,
    system_prompt: &str,
) -> Result<Conversation> {
    if prompt.trim().is_empty() {
        return Err(HistoryError::EmptyPrompt);
    }

    let mut conversation = existing.unwrap_or_else(|| Conversation::new(system_prompt));
    conversation.push_user(prompt);
    Ok(conversation)
}

/// Record the user's side of an exchange in the store.
///
/// Marks `id` as the last-used conversation and returns the transcript to send,
/// ending with the new user message. Nothing is written to disk.
pub fn start_turn(
    store: &TranscriptStore,
    id: &str,
    prompt: &str,
    system_prompt: &str,
) -> Result<Conversation> {
    if prompt.trim().is_empty() {
        return Err(HistoryError::EmptyPrompt);
    }

    store.set_last_id(id);
    let existing = store.get(id);
    let is_new = existing.is_none();
    let conversation = append_user_turn(existing, prompt, system_prompt)?;
    debug!(
        chat_id = %id,
        new = is_new,
        messages = conversation.messages.len(),
        "User turn appended"
    );
    store.put(id, conversation.clone());
    Ok(conversation)
}

/// Append the assistant's reply to a conversation already in the store.
pub fn finish_turn(store: &TranscriptStore, id: &str, reply: &str) -> Result<()> {
    let mut conversation = store
        .get(id)
        .ok_or_else(|| HistoryError::NotFound(id.to_string()))?;
    conversation.push_assistant(reply);
    debug!(chat_id = %id, chars = reply.len(), "Assistant turn appended");
    store.put(id, conversation);
    Ok(())
}
