//! Runtime settings and logging setup

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default log filter when neither `--log` nor `SITELENS_LOG` is given
pub const DEFAULT_LOG_FILTER: &str = "sitelens=info";

/// Where results are persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file
    File(PathBuf),
    /// Nothing survives the process
    Ephemeral,
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreLocation,
    pub log_filter: String,
}

impl Settings {
    /// Resolve settings from CLI/env inputs, filling in defaults.
    pub fn resolve(db: Option<PathBuf>, ephemeral: bool, log_filter: Option<String>) -> Self {
        let store = if ephemeral {
            StoreLocation::Ephemeral
        } else {
            StoreLocation::File(db.unwrap_or_else(default_db_path))
        };
        Self {
            store,
            log_filter: log_filter.unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }
}

/// Get the default database path (~/.local/share/sitelens/sitelens.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("sitelens").join("sitelens.db")
}

/// Install the global tracing subscriber, writing to stderr.
///
/// stdout is reserved for the notification stream.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber may already be installed (tests, embedding); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_db_path_wins() {
        let settings = Settings::resolve(Some(PathBuf::from("/tmp/x.db")), false, None);
        assert_eq!(settings.store, StoreLocation::File(PathBuf::from("/tmp/x.db")));
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn ephemeral_ignores_db_path() {
        let settings =
            Settings::resolve(Some(PathBuf::from("/tmp/x.db")), true, Some("debug".into()));
        assert_eq!(settings.store, StoreLocation::Ephemeral);
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn default_path_ends_in_sitelens_db() {
        let path = default_db_path();
        assert!(path.ends_with("sitelens/sitelens.db"));
    }
}
