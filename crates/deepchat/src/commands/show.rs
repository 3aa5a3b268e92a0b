//! Show command - print a conversation transcript.

use anyhow::{Result, anyhow};
use chrono::Local;
use console::{Style, style};
use deepchat_history::{Conversation, TranscriptStore};
use deepchat_types::Role;
use serde_json::json;

use super::Context;

/// Run the show command. Without an ID, shows the last-used conversation.
pub fn run(id: Option<&str>, ctx: &Context, store: &TranscriptStore) -> Result<()> {
    let id = match id.filter(|s| !s.is_empty()) {
        Some(id) => id.to_string(),
        None => store
            .last_id()
            .ok_or_else(|| anyhow!("No conversation to show. Pass an ID or start a chat first."))?,
    };

    let conversation = store
        .get(&id)
        .ok_or_else(|| anyhow!("Conversation not found: {}", id))?;

    if ctx.json_output {
        let output = json!({
            "id": id,
            "created_at": conversation.created_at,
            "messages": conversation.messages,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", render(&id, &conversation));
    }

    Ok(())
}

fn render(id: &str, conversation: &Conversation) -> String {
    let dim = Style::new().dim();
    let mut out = String::new();

    out.push_str(&format!(
        "{} {}\n",
        style(format!("Chat ID: {}", id)).bold(),
        dim.apply_to(format!(
            "(created {})",
            conversation
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ))
    ));
    out.push_str(&format!("{}\n", dim.apply_to("─".repeat(40))));

    for message in &conversation.messages {
        let label = match message.role {
            Role::System => dim.apply_to("system:").to_string(),
            Role::User => Style::new().cyan().bold().apply_to("you:").to_string(),
            Role::Assistant => Style::new().green().bold().apply_to("assistant:").to_string(),
        };
        out.push_str(&format!("{}\n{}\n\n", label, message.content));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepchat_config::Settings;
    use deepchat_history::History;

    fn ctx() -> Context {
        Context {
            json_output: false,
            verbose: false,
            settings: Settings::default(),
        }
    }

    #[test]
    fn test_render_lists_every_message() {
        let mut conv = Conversation::new("Be concise.");
        conv.push_user("What is Rust?");
        conv.push_assistant("A systems language.");

        let text = console::strip_ansi_codes(&render("abc", &conv)).to_string();
        assert!(text.starts_with("Chat ID: abc"));
        assert!(text.contains("system:\nBe concise."));
        assert!(text.contains("you:\nWhat is Rust?"));
        assert!(text.contains("assistant:\nA systems language."));
    }

    #[test]
    fn test_unknown_id_is_error() {
        let store = TranscriptStore::with_history("unused.json", History::default());
        let err = run(Some("ghost"), &ctx(), &store).unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_no_last_id_is_error() {
        let store = TranscriptStore::with_history("unused.json", History::default());
        assert!(run(None, &ctx(), &store).is_err());
    }

    #[test]
    fn test_defaults_to_last_id() {
        let store = TranscriptStore::with_history("unused.json", History::default());
        store.put("abc", Conversation::new("sys"));
        store.set_last_id("abc");
        assert!(run(None, &ctx(), &store).is_ok());
        assert_eq!(store.last_id().as_deref(), Some("abc"));
    }
}
