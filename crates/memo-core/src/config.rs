use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MemoError, Result};

/// Top-level configuration for the memo application.
///
/// Loaded from `~/.memo/config.toml` by default. Every section falls back to
/// its defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

impl MemoConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MemoConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MemoError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Full path of the SQLite file: `data_dir` (with `~` expanded) joined
    /// with `storage.database_file`.
    pub fn database_path(&self) -> PathBuf {
        resolve_data_dir(&self.general.data_dir).join(&self.storage.database_file)
    }
}

/// Expand a leading `~/` against the user's home directory.
pub fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") || data_dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// General application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory holding the database file.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.memo/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// SQLite storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// File name inside `general.data_dir`.
    pub database_file: String,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Change events buffered per live query before it has to re-sync.
    pub event_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_file: "memo.db".to_string(),
            busy_timeout_ms: 5_000,
            event_capacity: 256,
        }
    }
}

/// Display-list behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Newly created folders start expanded.
    pub expand_new_folders: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = MemoConfig::default();
        assert_eq!(config.general.data_dir, "~/.memo/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.storage.database_file, "memo.db");
        assert_eq!(config.storage.busy_timeout_ms, 5_000);
        assert_eq!(config.storage.event_capacity, 256);
        assert!(!config.board.expand_new_folders);
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"

[storage]
database_file = "notes.sqlite"
busy_timeout_ms = 250
event_capacity = 16

[board]
expand_new_folders = true
"#;
        let file = create_temp_config(content);
        let config = MemoConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.storage.database_file, "notes.sqlite");
        assert_eq!(config.storage.busy_timeout_ms, 250);
        assert_eq!(config.storage.event_capacity, 16);
        assert!(config.board.expand_new_folders);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/data/notes.sqlite")
        );
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = MemoConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.data_dir, "~/.memo/data");
        assert_eq!(config.storage.database_file, "memo.db");
    }

    #[test]
    fn test_load_invalid_config_is_config_error() {
        let file = create_temp_config("[general\nlog_level = ");
        let err = MemoConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, MemoError::Config(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = MemoConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config, MemoConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = MemoConfig::default();
        config.general.data_dir = dir.path().display().to_string();
        config.board.expand_new_folders = true;
        config.save(&path).unwrap();

        let reloaded = MemoConfig::load(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_resolve_data_dir_plain_path() {
        assert_eq!(resolve_data_dir("/var/memo"), PathBuf::from("/var/memo"));
    }

    #[test]
    fn test_resolve_data_dir_expands_home() {
        let resolved = resolve_data_dir("~/.memo/data");
        assert!(resolved.ends_with(".memo/data"));
        assert!(!resolved.starts_with("~"));
    }
}
