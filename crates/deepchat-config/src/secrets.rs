//! API key resolution.
//!
//! The bearer credential is read once from the environment at startup. Its
//! absence is a configuration error that stops the invocation before any
//! network call is attempted.

use crate::{ConfigError, Result};

/// Environment variable holding the bearer credential.
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Result of API key resolution with provenance.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("value", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
        }
    }
}

/// Resolve the API key from the process environment.
pub fn resolve_api_key() -> Result<ResolvedSecret> {
    resolve_api_key_with(|key| std::env::var(key).ok())
}

/// Resolve the API key from an arbitrary variable lookup. Empty values count as unset.
pub fn resolve_api_key_with<F>(lookup: F) -> Result<ResolvedSecret>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(API_KEY_ENV) {
        Some(value) if !value.trim().is_empty() => Ok(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(API_KEY_ENV.to_string()),
        }),
        _ => Err(ConfigError::ApiKeyNotFound {
            env_var: API_KEY_ENV.to_string(),
        }),
    }
}
