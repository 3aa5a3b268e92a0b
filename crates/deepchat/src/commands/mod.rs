//! CLI command handlers.

use anyhow::{Context as _, Result};
use console::Style;
use deepchat_config::ResolvedSecret;
use deepchat_config::Settings;
use deepchat_llm::{DeepSeekClient, DeepSeekConfig};

pub mod ask;
pub mod list;
pub mod models;
pub mod remove;
pub mod show;
pub mod status;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// Effective settings (file, environment and CLI flags applied).
    pub settings: Settings,
}

impl Context {
    /// Resolve the API key, failing before anything touches the network.
    pub fn api_key(&self) -> Result<ResolvedSecret> {
        let secret = deepchat_config::resolve_api_key()?;
        if self.verbose {
            let dim = Style::new().dim();
            eprintln!("{}", dim.apply_to(format!("API key from {}", secret.source)));
        }
        Ok(secret)
    }

    /// Build a DeepSeek client from the settings and a resolved key.
    pub fn client(&self, secret: &ResolvedSecret) -> Result<DeepSeekClient> {
        let config = DeepSeekConfig::new(secret.value.clone(), self.settings.base_url.clone())
            .with_timeout(self.settings.request_timeout());
        DeepSeekClient::new(config).context("failed to create API client")
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with `...`.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Collapse all whitespace runs, including newlines, to single spaces.
pub(crate) fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
