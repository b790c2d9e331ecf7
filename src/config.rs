// Store configuration.
//
// Built explicitly and handed to Store::open;
// nothing here is global. StoreConfig::from_env overlays environment
// variables on top of the defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "tracked-query.db";

/// Environment variable overriding the database path.
pub const ENV_DB_PATH: &str = "TRACKED_QUERY_DB";

/// Environment variable overriding the journal mode (`wal` or `delete`).
pub const ENV_JOURNAL_MODE: &str = "TRACKED_QUERY_JOURNAL";

/// SQLite journal mode applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    /// Write-ahead log (crash recovery, readers don't block the writer)
    Wal,
    /// Classic rollback journal
    Delete,
}

impl JournalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
        }
    }

    /// Parse a case-insensitive mode name.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "wal" => Some(JournalMode::Wal),
            "delete" => Some(JournalMode::Delete),
            _ => None,
        }
    }
}

/// Where and how the store keeps its data.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite database file; created on first use.
    pub path: PathBuf,

    pub journal_mode: JournalMode,

    /// How long a connection waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    /// Config for a database at `path` with default settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            path: path.into(),
            ..StoreConfig::default()
        }
    }

    /// Defaults overlaid with `TRACKED_QUERY_DB` and `TRACKED_QUERY_JOURNAL`.
    ///
    /// Unknown journal modes are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = StoreConfig::default();

        if let Ok(path) = std::env::var(ENV_DB_PATH) {
            if !path.trim().is_empty() {
                config.path = PathBuf::from(path);
            }
        }

        if let Ok(mode) = std::env::var(ENV_JOURNAL_MODE) {
            match JournalMode::parse(&mode) {
                Some(mode) => config.journal_mode = mode,
                None => tracing::warn!(value = %mode, "unknown journal mode, keeping default"),
            }
        }

        config
    }

    pub fn with_journal_mode(mut self, journal_mode: JournalMode) -> Self {
        self.journal_mode = journal_mode;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            path: PathBuf::from(DEFAULT_DB_PATH),
            journal_mode: JournalMode::Wal,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();

        assert_eq!(config.path, PathBuf::from("tracked-query.db"));
        assert_eq!(config.journal_mode, JournalMode::Wal);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_new_keeps_defaults() {
        let config = StoreConfig::new("/tmp/people.db").with_journal_mode(JournalMode::Delete);

        assert_eq!(config.path, PathBuf::from("/tmp/people.db"));
        assert_eq!(config.journal_mode, JournalMode::Delete);
        assert_eq!(config.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_busy_timeout_override() {
        let config = StoreConfig::default().with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_journal_mode_parse() {
        assert_eq!(JournalMode::parse("WAL"), Some(JournalMode::Wal));
        assert_eq!(JournalMode::parse(" delete "), Some(JournalMode::Delete));
        assert_eq!(JournalMode::parse("memory"), None);
        assert_eq!(JournalMode::Wal.as_str(), "WAL");
    }
}
