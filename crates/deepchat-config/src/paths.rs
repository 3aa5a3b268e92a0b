//! Fixed filesystem locations.

use std::path::{Path, PathBuf};

use crate::discovery::config_dir;

/// History file name under the home directory.
const HISTORY_FILE_NAME: &str = ".deepseek_history.json";

/// Default history file: `~/.deepseek_history.json`.
pub fn default_history_path() -> PathBuf {
    home().join(HISTORY_FILE_NAME)
}

/// Directory for rolling log files: `<config_dir>/logs`.
pub fn log_dir() -> PathBuf {
    config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_history_path_under_home() {
        let path = default_history_path();
        assert_eq!(path.file_name().unwrap(), ".deepseek_history.json");
        assert_eq!(path.parent().unwrap(), home());
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(
            expand_tilde(Path::new("~/notes/h.json")),
            home().join("notes/h.json")
        );
        assert_eq!(expand_tilde(Path::new("~")), home());
    }

    #[test]
    fn test_expand_tilde_leaves_other_paths() {
        assert_eq!(
            expand_tilde(Path::new("/abs/h.json")),
            PathBuf::from("/abs/h.json")
        );
        assert_eq!(
            expand_tilde(Path::new("rel/~h.json")),
            PathBuf::from("rel/~h.json")
        );
    }
}
