//! User settings.
//!
//! # Configuration
//!
//! ```toml
//! model = "deepseek-chat"
//! base_url = "https://api.deepseek.com/v1"
//! status_url = "https://status.deepseek.com/api/v2/status.json"
//! system_prompt = "You are a helpful assistant. Be concise."
//! history_file = "~/.deepseek_history.json"
//! request_timeout_secs = 10
//! ```
//!
//! # Environment Variables
//!
//! - `DEEPSEEK_ROLE` - Override the system instruction seeded into new conversations
//! - `DEEPCHAT_BASE_URL` - Override the API base URL
//! - `DEEPCHAT_HISTORY_FILE` - Override the history file location

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::paths::{default_history_path, expand_tilde};

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Default service status endpoint.
pub const DEFAULT_STATUS_URL: &str = "https://status.deepseek.com/api/v2/status.json";

/// Built-in system instruction for new conversations.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Be concise.";

/// Default timeout for the model listing and status calls.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding the system instruction.
pub const ROLE_ENV: &str = "DEEPSEEK_ROLE";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "DEEPCHAT_BASE_URL";

/// Environment variable overriding the history file path.
pub const HISTORY_FILE_ENV: &str = "DEEPCHAT_HISTORY_FILE";

/// Effective settings for one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Model used when `--model` is not given.
    pub model: String,

    /// Base URL of the OpenAI-compatible API (without trailing slash).
    pub base_url: String,

    /// Status page JSON endpoint.
    pub status_url: String,

    /// System instruction seeded into every new conversation.
    pub system_prompt: String,

    /// History file location. `None` means `~/.deepseek_history.json`.
    pub history_file: Option<PathBuf>,

    /// Timeout applied to the model listing and status calls.
    /// The completion request itself has no timeout.
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            status_url: DEFAULT_STATUS_URL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_file: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string. Missing keys keep their defaults.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(role) = get(ROLE_ENV) {
            self.system_prompt = role;
        }
        if let Some(url) = get(BASE_URL_ENV) {
            self.base_url = url;
        }
        if let Some(path) = get(HISTORY_FILE_ENV) {
            self.history_file = Some(PathBuf::from(path));
        }
    }

    /// Resolved history file path.
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(default_history_path)
    }

    /// Timeout for the short auxiliary calls.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model, "deepseek-chat");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(settings.history_file.is_none());
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml(r#"model = "deepseek-reasoner""#).unwrap();
        assert_eq!(settings.model, "deepseek-reasoner");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_full_toml() {
        let settings = Settings::from_toml(
            r#"
            model = "m"
            base_url = "http://localhost:9000/v1"
            status_url = "http://localhost:9000/status"
            system_prompt = "Answer in French."
            history_file = "/tmp/h.json"
            request_timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.base_url, "http://localhost:9000/v1");
        assert_eq!(settings.system_prompt, "Answer in French.");
        assert_eq!(settings.history_path(), PathBuf::from("/tmp/h.json"));
        assert_eq!(settings.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Settings::from_toml("model = [").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(lookup(&[
            (ROLE_ENV, "You are a pirate."),
            (BASE_URL_ENV, "http://127.0.0.1:1234"),
            (HISTORY_FILE_ENV, "/var/tmp/history.json"),
        ]));

        assert_eq!(settings.system_prompt, "You are a pirate.");
        assert_eq!(settings.base_url, "http://127.0.0.1:1234");
        assert_eq!(settings.history_path(), PathBuf::from("/var/tmp/history.json"));
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut settings = Settings::default();
        settings.apply_overrides(lookup(&[(ROLE_ENV, ""), (BASE_URL_ENV, "  ")]));
        assert_eq!(settings.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_default_history_path() {
        let settings = Settings::default();
        assert!(settings.history_path().ends_with(".deepseek_history.json"));
    }
}
