//! Configuration for deepchat.
//!
//! Provides:
//! - A TOML settings file (`<config_dir>/config.toml`) with defaults for every key
//! - Environment overrides layered on top of the file
//! - Bearer credential resolution from the environment
//! - The fixed paths the CLI reads and writes (history file, log directory)
//!
//! Resolution order (later overrides earlier): built-in defaults, settings
//! file, environment, CLI flags (handled by the binary).

pub mod discovery;
pub mod error;
pub mod paths;
pub mod secrets;
pub mod settings;

pub use discovery::{LoadedSettings, config_dir, config_path, load_settings, load_settings_file};
pub use error::{ConfigError, Result};
pub use paths::{default_history_path, expand_tilde, log_dir};
pub use secrets::{
    API_KEY_ENV, ResolvedSecret, SecretSource, resolve_api_key, resolve_api_key_with,
};
pub use settings::Settings;
