//! deepchat - command-line chat client for DeepSeek
//!
//! Main entry point for the deepchat CLI.

use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgGroup, Parser};
use console::Style;
use deepchat_history::TranscriptStore;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

mod commands;

use commands::{ask, list, models, remove, show, status};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// deepchat - chat with DeepSeek models from the command line
///
/// Sends PROMPT to the model and streams the reply. Conversations are kept in
/// a local history file so later runs continue where the last one left off.
#[derive(Parser, Debug)]
#[command(name = "deepchat")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .args(["ls", "rm", "show", "status", "models"])
        .multiple(false)
        .conflicts_with("prompt")
))]
pub struct Cli {
    /// Prompt to send
    pub prompt: Option<String>,

    /// Model to use (default: deepseek-chat)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Conversation ID to continue
    #[arg(short, long, value_name = "ID")]
    pub chat: Option<String>,

    /// Start a new conversation
    #[arg(short, long)]
    pub new: bool,

    /// List all conversations and their last user message
    #[arg(long)]
    pub ls: bool,

    /// Remove a conversation by ID, or all older than AGE (e.g. 10d, 72h)
    #[arg(long, value_name = "ID|AGE")]
    pub rm: Option<String>,

    /// Print a conversation transcript (defaults to the last one used)
    #[arg(long, value_name = "ID")]
    pub show: Option<Option<String>>,

    /// Check DeepSeek service status
    #[arg(long)]
    pub status: bool,

    /// List models available to the API key
    #[arg(long)]
    pub models: bool,

    /// Output as JSON (for scripting)
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log request bodies and raw stream lines
    #[arg(long)]
    pub debug: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

const CRATE_TARGETS: [&str; 4] = [
    "deepchat",
    "deepchat_config",
    "deepchat_history",
    "deepchat_llm",
];

fn crate_filter(level: &str, fallback: &str) -> String {
    let mut directives: Vec<String> = CRATE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.push(fallback.to_string());
    directives.join(",")
}

/// Console (human-readable, stderr) + rotating JSON file.
///
/// The returned guard flushes the file writer on drop and must live until exit.
fn init_tracing(verbose: bool, debug: bool) -> Option<WorkerGuard> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(crate_filter(level, "warn")));

    let console = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let log_dir = deepchat_config::log_dir();
    let (file, guard) = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("deepchat.log")
        .build(&log_dir)
    {
        Ok(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new(crate_filter("debug", "info")));
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .init();

    guard
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let red = Style::new().red();
            eprintln!("{} {:#}", red.apply_to("Error:"), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let loaded = deepchat_config::load_settings(None);
    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    let mut settings = loaded.settings;
    if let Some(model) = cli.model {
        settings.model = model;
    }

    // Create context for commands
    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        settings,
    };

    // Dispatch to command handlers
    if cli.status {
        return status::run(&ctx).await;
    }
    if cli.models {
        return models::run(&ctx).await;
    }

    let store = TranscriptStore::open(ctx.settings.history_path());

    if let Some(criteria) = cli.rm {
        return remove::run(&criteria, &store);
    }
    if cli.ls {
        return list::run(&ctx, &store);
    }
    if let Some(id) = cli.show {
        return show::run(id.as_deref(), &ctx, &store);
    }

    let args = ask::AskArgs {
        prompt: cli.prompt,
        chat: cli.chat,
        new: cli.new,
    };
    ask::run(args, &ctx, &store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_prompt_with_options() {
        let cli = Cli::try_parse_from(["deepchat", "-m", "deepseek-reasoner", "-c", "abc", "hello"])
            .unwrap();
        assert_eq!(cli.prompt.as_deref(), Some("hello"));
        assert_eq!(cli.model.as_deref(), Some("deepseek-reasoner"));
        assert_eq!(cli.chat.as_deref(), Some("abc"));
        assert!(!cli.new);
    }

    #[test]
    fn test_show_value_is_optional() {
        let cli = Cli::try_parse_from(["deepchat", "--show"]).unwrap();
        assert_eq!(cli.show, Some(None));

        let cli = Cli::try_parse_from(["deepchat", "--show", "abc"]).unwrap();
        assert_eq!(cli.show, Some(Some("abc".to_string())));
    }

    #[test]
    fn test_actions_conflict() {
        assert!(Cli::try_parse_from(["deepchat", "--ls", "--status"]).is_err());
        assert!(Cli::try_parse_from(["deepchat", "--ls", "hello"]).is_err());
        assert!(Cli::try_parse_from(["deepchat", "--rm", "10d", "--models"]).is_err());
    }

    #[test]
    fn test_crate_filter() {
        assert_eq!(
            crate_filter("debug", "warn"),
            "deepchat=debug,deepchat_config=debug,deepchat_history=debug,deepchat_llm=debug,warn"
        );
    }
}
