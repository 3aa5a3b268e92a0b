//! Remove command - delete one conversation by ID, or all older than an age.

use anyhow::{Result, bail};
use chrono::Local;
use deepchat_history::{HistoryError, RemovalOutcome, TranscriptStore};

/// Run the remove command.
///
/// An argument that parses as an age is always treated as one, even if a
/// conversation with that literal ID exists.
pub fn run(criteria: &str, store: &TranscriptStore) -> Result<()> {
    let outcome = match store.remove(criteria) {
        Ok(outcome) => outcome,
        Err(HistoryError::NotFound(_)) => {
            bail!(
                "Invalid input: '{}' is not a valid age or chat ID.",
                criteria
            );
        }
        Err(e) => return Err(e.into()),
    };

    for line in describe(&outcome) {
        println!("{}", line);
    }

    if outcome.changed() {
        store.save()?;
    }
    Ok(())
}

fn describe(outcome: &RemovalOutcome) -> Vec<String> {
    match outcome {
        RemovalOutcome::Removed { id } => vec![format!("Chat ID: {} removed.", id)],
        RemovalOutcome::Expired { cutoff, removed } => {
            let mut lines = vec![format!(
                "Removing chats older than: {}",
                cutoff.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            )];
            if removed.is_empty() {
                lines.push(
                    "No chats were removed. All chats are within the specified age.".to_string(),
                );
            }
            for id in removed {
                lines.push(format!("Chat ID: {} removed due to age.", id));
            }
            lines
        }
    }
}
