//! Persisted history types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use deepchat_types::{Message, Role};
use serde::{Deserialize, Deserializer, Serialize};

/// One conversation thread.
///
/// `messages` is append-only and chronological; it is replayed verbatim to the
/// model as context. The first message is always the system instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    /// Fixed at creation.
    pub created_at: DateTime<Utc>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation now, seeded with a system message.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self::started_at(Utc::now(), system_prompt)
    }

    /// Start a conversation at a given instant, seeded with a system message.
    pub fn started_at(created_at: DateTime<Utc>, system_prompt: impl Into<String>) -> Self {
        Self {
            created_at,
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Content of the most recent user message.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// The full contents of the history file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    /// Most recently used conversation ID; empty when none.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_chat_id: String,

    /// Conversations keyed by ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: BTreeMap<String, Conversation>,
}

/// Accept `null` wherever a collection or string is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_new_conversation_starts_with_system() {
        let conv = Conversation::new("Be concise.");
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].role, Role::System);
        assert_eq!(conv.messages[0].content, "Be concise.");
        assert!(conv.last_user_message().is_none());
    }

    #[test]
    fn test_last_user_message() {
        let mut conv = Conversation::new("sys");
        conv.push_user("first");
        conv.push_assistant("reply");
        conv.push_user("second");
        conv.push_assistant("reply 2");
        assert_eq!(conv.last_user_message(), Some("second"));
    }

    #[test]
    fn test_history_file_shape() {
        let created = Utc.with_ymd_and_hms(2025, 1, 28, 10, 0, 0).unwrap();
        let mut history = History {
            last_chat_id: "abc".to_string(),
            ..Default::default()
        };
        history
            .history
            .insert("abc".to_string(), Conversation::started_at(created, "sys"));

        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(value["last_chat_id"], "abc");
        assert_eq!(value["history"]["abc"]["created_at"], "2025-01-28T10:00:00Z");
        assert_eq!(value["history"]["abc"]["messages"][0]["role"], "system");
    }

    #[test]
    fn test_reads_offset_timestamps_and_nulls() {
        let json = r#"{
            "last_chat_id": "9f86d081884c7d65",
            "history": {
                "9f86d081884c7d65": {
                    "created_at": "2025-01-28T11:00:00.123456789+01:00",
                    "messages": [
                        {"role": "system", "content": "sys"},
                        {"role": "user", "content": "hi"}
                    ]
                },
                "empty": {"created_at": "2025-01-01T00:00:00Z", "messages": null}
            }
        }"#;
        let history: History = serde_json::from_str(json).unwrap();
        let conv = &history.history["9f86d081884c7d65"];
        assert_eq!(
            conv.created_at,
            Utc.with_ymd_and_hms(2025, 1, 28, 10, 0, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789)
        );
        assert_eq!(conv.messages.len(), 2);
        assert!(history.history["empty"].messages.is_empty());
    }

    #[test]
    fn test_null_history_map() {
        let history: History = serde_json::from_str(r#"{"last_chat_id":"","history":null}"#).unwrap();
        assert!(history.history.is_empty());
    }
}
