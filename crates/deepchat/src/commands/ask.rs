//! Ask command - send a prompt and stream the reply into the conversation.

use std::io::Write;

use anyhow::{Result, bail};
use console::Style;
use deepchat_history::{TranscriptStore, session};
use deepchat_llm::{ChatBackend, Completion, StreamReassembler};
use tracing::{error, info, warn};

use super::Context;

/// Arguments for the ask command.
#[derive(Debug, Default)]
pub struct AskArgs {
    /// The prompt to send.
    pub prompt: Option<String>,
    /// Conversation to continue.
    pub chat: Option<String>,
    /// Start a new conversation.
    pub new: bool,
}

/// Run the ask command.
pub async fn run(args: AskArgs, ctx: &Context, store: &TranscriptStore) -> Result<()> {
    let secret = ctx.api_key()?;
    let dim = Style::new().dim();

    let last = store.last_id();
    let chat_id = session::resolve_conversation_id(args.chat.as_deref(), args.new, last.as_deref());
    if ctx.verbose {
        let note = if args.chat.as_deref().is_some_and(|c| !c.is_empty()) && !args.new {
            "Using chat-id"
        } else if last.as_deref() == Some(chat_id.as_str()) {
            "Using last chat-id"
        } else {
            "New chat-id generated"
        };
        eprintln!("{}", dim.apply_to(format!("{}: {}", note, chat_id)));
    }

    let Some(prompt) = args.prompt.filter(|p| !p.trim().is_empty()) else {
        bail!("You must provide a prompt as an argument.");
    };

    let client = ctx.client(&secret)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let completion = exchange(&client, store, &chat_id, &prompt, ctx, &mut out).await?;

    if completion.is_truncated() {
        let yellow = Style::new().yellow();
        eprintln!(
            "{} the reply ended before the server signalled completion; it was saved as received",
            yellow.apply_to("Warning:")
        );
    }

    // A failed save is reported but does not fail the exchange.
    if let Err(e) = store.save() {
        error!(error = %e, "Failed to save history");
        let red = Style::new().red();
        eprintln!("{} {}", red.apply_to("Error saving history:"), e);
    }

    Ok(())
}

/// One request/response round trip against `backend`.
///
/// The user turn is recorded in `store` before the request is sent and the
/// assistant turn once the stream ends. Fragments are echoed to `out` as they
/// arrive, followed by a newline. A failing `out` never loses the reply: it is
/// still recorded. Nothing is written to disk. On a transport error the
/// conversation keeps the user turn in memory only, so it is lost unless the
/// caller saves.
pub async fn exchange<B, W>(
    backend: &B,
    store: &TranscriptStore,
    chat_id: &str,
    prompt: &str,
    ctx: &Context,
    out: &mut W,
) -> Result<Completion>
where
    B: ChatBackend + ?Sized,
    W: Write,
{
    let conversation = session::start_turn(store, chat_id, prompt, &ctx.settings.system_prompt)?;
    info!(
        chat_id = %chat_id,
        model = %ctx.settings.model,
        messages = conversation.messages.len(),
        "Sending prompt"
    );

    let lines = backend
        .stream_chat(&ctx.settings.model, &conversation.messages)
        .await?;

    let result = StreamReassembler::reassemble(lines, &mut *out).await;
    end_reply(out);
    let completion = result?;

    if completion.is_truncated() {
        warn!(chat_id = %chat_id, chars = completion.text.len(), "Saving truncated reply");
    }
    session::finish_turn(store, chat_id, &completion.text)?;

    Ok(completion)
}

/// Terminate the echoed reply with a newline.
fn end_reply<W: Write>(out: &mut W) {
    if let Err(e) = writeln!(out).and_then(|_| out.flush()) {
        warn!(error = %e, "Failed to finish reply output");
    }
}
