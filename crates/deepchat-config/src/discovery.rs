//! Settings file discovery and loading.
//!
//! Resolution order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `<config_dir>/config.toml`
//! 3. Environment variables (see [`Settings::apply_env`])
//! 4. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, Settings};

/// Settings filename within the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application name for config directory resolution.
const APP_NAME: &str = "deepchat";

/// Environment variable to override the config directory.
///
/// When set, this takes precedence over the platform default.
const CONFIG_DIR_ENV: &str = "DEEPCHAT_CONFIG_DIR";

/// Result of settings discovery.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    /// The effective settings (file + environment).
    pub settings: Settings,
    /// Settings file that was loaded, if any.
    pub source: Option<PathBuf>,
    /// Problems encountered while loading (the defaults were used instead).
    pub warnings: Vec<String>,
}

/// Load settings from the config directory and apply environment overrides.
///
/// `config_dir` overrides both `DEEPCHAT_CONFIG_DIR` and the platform default.
/// A missing file is not an error; an unreadable or invalid file produces a
/// warning and the defaults are kept.
pub fn load_settings(config_dir_override: Option<&Path>) -> LoadedSettings {
    let path = match config_dir_override {
        Some(dir) => Some(dir.join(CONFIG_FILE)),
        None => config_path(),
    };

    let mut warnings = Vec::new();
    let mut source = None;

    let mut settings = match path {
        Some(ref path) if path.is_file() => match load_settings_file(path) {
            Ok(settings) => {
                source = Some(path.clone());
                settings
            }
            Err(e) => {
                warnings.push(format!("Failed to load {}: {}", path.display(), e));
                Settings::default()
            }
        },
        _ => Settings::default(),
    };

    settings.apply_env();

    tracing::debug!(
        source = ?source,
        model = %settings.model,
        base_url = %settings.base_url,
        "Settings loaded"
    );

    LoadedSettings {
        settings,
        source,
        warnings,
    }
}

/// Load settings from a specific file path (no discovery, no environment).
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    Settings::from_toml(&contents)
}

/// Path of the settings file.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(CONFIG_FILE))
}

/// The deepchat config directory.
///
/// Checks `DEEPCHAT_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/deepchat` on Linux, `~/Library/Application Support/deepchat` on macOS).
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_MODEL;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_settings(Some(dir.path()));
        assert!(loaded.source.is_none());
        assert!(loaded.warnings.is_empty());
        assert_eq!(loaded.settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "model = \"deepseek-reasoner\"\nrequest_timeout_secs = 2\n").unwrap();

        let loaded = load_settings(Some(dir.path()));
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.settings.model, "deepseek-reasoner");
        assert_eq!(loaded.settings.request_timeout_secs, 2);
    }

    #[test]
    fn test_invalid_file_warns_and_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "model = [broken").unwrap();

        let loaded = load_settings(Some(dir.path()));
        assert!(loaded.source.is_none());
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("config.toml"));
        assert_eq!(loaded.settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_load_settings_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
