//! Runtime configuration read from the environment.
//!
//! # Responsibility
//! - Resolve storage location, backend, persistence mode and logging setup.
//! - Build the configured repository and a loaded [`Board`].
//!
//! # Invariants
//! - Every variable has a default; an empty environment is a valid config.
//! - Malformed values are rejected, never silently replaced by defaults.

use crate::logging::{default_log_level, normalize_level};
use crate::model::note::Position;
use crate::repo::json_repo::JsonFileNoteRepository;
use crate::repo::note_repo::{NoteRepository, RepoResult};
use crate::repo::sqlite_repo::SqliteNoteRepository;
use crate::service::board::Board;
use crate::service::note_store::NoteStore;
use crate::service::persist::PersistMode;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Environment variable names.
pub mod env_vars {
    pub const DATA_DIR: &str = "STICKYNOTES_DATA_DIR";
    /// `json` or `sqlite`.
    pub const STORAGE: &str = "STICKYNOTES_STORAGE";
    /// `immediate` or `background`.
    pub const PERSIST: &str = "STICKYNOTES_PERSIST";
    /// Quiet period before a background write, in milliseconds.
    pub const DEBOUNCE_MS: &str = "STICKYNOTES_DEBOUNCE_MS";
    pub const LOG_LEVEL: &str = "STICKYNOTES_LOG_LEVEL";
    pub const LOG_DIR: &str = "STICKYNOTES_LOG_DIR";
}

/// Default values.
pub mod defaults {
    pub const DATA_DIR: &str = "./.stickynotes";
    pub const JSON_FILE_NAME: &str = "notes.json";
    pub const SQLITE_FILE_NAME: &str = "notes.sqlite3";
    pub const LOG_DIR_NAME: &str = "logs";
    pub const DEBOUNCE_MS: u64 = 0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Json,
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                var,
                value,
                expected,
            } => write!(f, "invalid {var}=`{value}`; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub persist_mode: PersistMode,
    /// Normalized `trace|debug|info|warn|error`.
    pub log_level: &'static str,
    pub log_dir: PathBuf,
    pub default_position: Position,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from(defaults::DATA_DIR);
        Self {
            log_dir: data_dir.join(defaults::LOG_DIR_NAME),
            data_dir,
            storage: StorageBackend::Json,
            persist_mode: PersistMode::Background {
                debounce: Duration::from_millis(defaults::DEBOUNCE_MS),
            },
            log_level: default_log_level(),
            default_position: Position::DEFAULT_NOTE,
        }
    }
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(dir) = read(env_vars::DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        config.log_dir = match read(env_vars::LOG_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => config.data_dir.join(defaults::LOG_DIR_NAME),
        };

        if let Some(value) = read(env_vars::STORAGE) {
            config.storage = match value.to_ascii_lowercase().as_str() {
                "json" => StorageBackend::Json,
                "sqlite" => StorageBackend::Sqlite,
                _ => return Err(invalid(env_vars::STORAGE, value, "json|sqlite")),
            };
        }

        let debounce = match read(env_vars::DEBOUNCE_MS) {
            Some(value) => match value.parse::<u64>() {
                Ok(millis) => Duration::from_millis(millis),
                Err(_) => {
                    return Err(invalid(
                        env_vars::DEBOUNCE_MS,
                        value,
                        "a non-negative integer",
                    ))
                }
            },
            None => Duration::from_millis(defaults::DEBOUNCE_MS),
        };
        config.persist_mode = match read(env_vars::PERSIST).map(|v| v.to_ascii_lowercase()) {
            None => PersistMode::Background { debounce },
            Some(mode) if mode == "background" => PersistMode::Background { debounce },
            Some(mode) if mode == "immediate" => PersistMode::Immediate,
            Some(other) => return Err(invalid(env_vars::PERSIST, other, "immediate|background")),
        };

        if let Some(level) = read(env_vars::LOG_LEVEL) {
            config.log_level = normalize_level(&level)
                .map_err(|_| invalid(env_vars::LOG_LEVEL, level, "trace|debug|info|warn|error"))?;
        }

        Ok(config)
    }

    /// File holding the notes for the configured backend.
    pub fn notes_path(&self) -> PathBuf {
        let file_name = match self.storage {
            StorageBackend::Json => defaults::JSON_FILE_NAME,
            StorageBackend::Sqlite => defaults::SQLITE_FILE_NAME,
        };
        self.data_dir.join(file_name)
    }

    /// `log_dir` resolved against the current directory.
    pub fn absolute_log_dir(&self) -> std::io::Result<PathBuf> {
        absolute(&self.log_dir)
    }

    pub fn open_repository(&self) -> RepoResult<Arc<dyn NoteRepository>> {
        let path = self.notes_path();
        Ok(match self.storage {
            StorageBackend::Json => Arc::new(JsonFileNoteRepository::new(path)),
            StorageBackend::Sqlite => Arc::new(SqliteNoteRepository::open(path)?),
        })
    }

    /// Builds the configured store and returns a board with notes loaded.
    pub fn open_board(&self) -> RepoResult<Board> {
        let store = NoteStore::new(self.open_repository()?, self.persist_mode)
            .with_default_position(self.default_position);
        let mut board = Board::new(store);
        board.load();
        Ok(board)
    }
}

fn invalid(var: &'static str, value: String, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value,
        expected,
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::{env_vars, AppConfig, ConfigError, StorageBackend};
    use crate::service::persist::PersistMode;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.storage, StorageBackend::Json);
        assert!(config.notes_path().ends_with("notes.json"));
    }

    #[test]
    fn overrides_are_parsed_and_log_dir_follows_data_dir() {
        let config = config_from(&[
            (env_vars::DATA_DIR, "/tmp/board"),
            (env_vars::STORAGE, "SQLite"),
            (env_vars::PERSIST, "background"),
            (env_vars::DEBOUNCE_MS, "250"),
            (env_vars::LOG_LEVEL, "Warning"),
        ])
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Sqlite);
        assert_eq!(config.notes_path(), PathBuf::from("/tmp/board/notes.sqlite3"));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/board/logs"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(
            config.persist_mode,
            PersistMode::Background {
                debounce: Duration::from_millis(250)
            }
        );
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config_from(&[(env_vars::STORAGE, "  "), (env_vars::PERSIST, "")]).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn malformed_values_are_rejected() {
        let err = config_from(&[(env_vars::STORAGE, "postgres")]).unwrap_err();
        assert!(err.to_string().contains("json|sqlite"));

        let err = config_from(&[(env_vars::DEBOUNCE_MS, "-5")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == env_vars::DEBOUNCE_MS));

        let err = config_from(&[(env_vars::LOG_LEVEL, "loud")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var, .. } if var == env_vars::LOG_LEVEL));
    }

    #[test]
    fn immediate_mode_ignores_debounce() {
        let config = config_from(&[
            (env_vars::PERSIST, "immediate"),
            (env_vars::DEBOUNCE_MS, "100"),
        ])
        .unwrap();
        assert_eq!(config.persist_mode, PersistMode::Immediate);
    }
}
