//! List command - all conversations, newest first.

use anyhow::Result;
use chrono::{DateTime, Local, TimeDelta, Utc};
use deepchat_history::{Conversation, TranscriptStore};
use serde::Serialize;

use super::{Context, single_line, truncate};

/// Width of the last-user-message column.
const MESSAGE_WIDTH: usize = 30;

/// One conversation for JSON output.
#[derive(Debug, Serialize)]
struct ChatSummary {
    id: String,
    created_at: DateTime<Utc>,
    message_count: usize,
    last_user_message: Option<String>,
    current: bool,
}

/// Run the list command.
pub fn run(ctx: &Context, store: &TranscriptStore) -> Result<()> {
    let last = store.last_id();
    let chats = store.list();

    if ctx.json_output {
        let summaries: Vec<ChatSummary> = chats
            .iter()
            .map(|(id, conv)| ChatSummary {
                id: id.clone(),
                created_at: conv.created_at,
                message_count: conv.messages.len(),
                last_user_message: conv.last_user_message().map(str::to_string),
                current: last.as_deref() == Some(id.as_str()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", header());
    for (id, conv) in &chats {
        println!("{}", row(id, conv, last.as_deref() == Some(id.as_str()), now));
    }

    Ok(())
}

fn header() -> String {
    format!(
        "{:<2} {:<18} {:<10} {:<20} {}",
        "", "CHAT ID", "AGE", "CREATED AT", "LAST USER MESSAGE"
    )
}

fn row(id: &str, conv: &Conversation, current: bool, now: DateTime<Utc>) -> String {
    let marker = if current { "*" } else { "" };
    let age = format_age(now.signed_duration_since(conv.created_at));
    let created = conv
        .created_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S");
    let message = conv
        .last_user_message()
        .map(|m| truncate(&single_line(m), MESSAGE_WIDTH))
        .unwrap_or_default();

    format!(
        "{:<2} {:<18} {:<10} {:<20} {}",
        marker, id, age, created, message
    )
    .trim_end()
    .to_string()
}

/// Compact age: the two largest non-zero units, e.g. `3d4h`, `5h12m`, `42s`.
fn format_age(age: TimeDelta) -> String {
    let secs = age.num_seconds().max(0);
    let units = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

    let mut rest = secs;
    let mut parts = Vec::new();
    for (size, suffix) in units {
        let n = rest / size;
        rest %= size;
        if n > 0 {
            parts.push(format!("{}{}", n, suffix));
        } else if !parts.is_empty() {
            // A zero after the leading unit ends the run.
            break;
        }
        if parts.len() == 2 {
            break;
        }
    }

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(TimeDelta::seconds(0)), "0s");
        assert_eq!(format_age(TimeDelta::seconds(42)), "42s");
        assert_eq!(format_age(TimeDelta::seconds(125)), "2m5s");
        assert_eq!(format_age(TimeDelta::hours(5) + TimeDelta::minutes(12)), "5h12m");
        assert_eq!(
            format_age(TimeDelta::days(3) + TimeDelta::hours(4) + TimeDelta::seconds(9)),
            "3d4h"
        );
        assert_eq!(format_age(TimeDelta::days(2) + TimeDelta::minutes(5)), "2d");
        assert_eq!(format_age(TimeDelta::seconds(-30)), "0s");
    }

    #[test]
    fn test_row_marks_current_and_truncates() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut conv = Conversation::started_at(created, "sys");
        conv.push_user("first");
        conv.push_assistant("reply");
        conv.push_user("a very long question\nthat spans lines and keeps going");

        let line = row("9f86d081884c7d65", &conv, true, created + TimeDelta::hours(2));
        assert!(line.starts_with("*  9f86d081884c7d65"));
        assert!(line.contains("2h"));
        assert!(line.ends_with("a very long question that s..."));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_row_without_user_message() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let conv = Conversation::started_at(created, "sys");

        let line = row("abc", &conv, false, created);
        assert!(line.starts_with("   abc"));
        assert!(!line.ends_with(' '));
    }

    #[test]
    fn test_header_columns() {
        let header = header();
        for column in ["CHAT ID", "AGE", "CREATED AT", "LAST USER MESSAGE"] {
            assert!(header.contains(column));
        }
    }
}
