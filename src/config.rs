//! Runtime settings and limits.
//!
//! Settings come from the environment, after `.env` has been loaded by the binary.

use chrono::NaiveDate;
use std::env;
use std::path::PathBuf;

/// Most addresses a network may list one by one.
pub const MAX_HOSTS: usize = 65536;

/// Most contiguous runs an irregular mask may be split into. Each run may hold many addresses.
pub const MAX_IRREGULAR_RUNS: usize = 65536;

pub const ENV_LOG_CONFIG: &str = "NETALG_LOG_CONFIG";
pub const ENV_ROUTE_FILE: &str = "NETALG_ROUTE_FILE";
pub const ENV_SNAPSHOT_DIR: &str = "NETALG_SNAPSHOT_DIR";

pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// log4rs configuration file.
    pub log_config: String,
    /// Route definition JSON.
    pub route_file: Option<String>,
    /// Where the resolved tables are written, if set.
    pub snapshot_dir: Option<PathBuf>,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Settings::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Settings {
            log_config: get(ENV_LOG_CONFIG).unwrap_or_else(|| DEFAULT_LOG_CONFIG.to_string()),
            route_file: get(ENV_ROUTE_FILE),
            snapshot_dir: get(ENV_SNAPSHOT_DIR).map(PathBuf::from),
        }
    }

    /// Dated snapshot path, `None` when no snapshot directory is configured.
    pub fn snapshot_path(&self, date: NaiveDate) -> Option<PathBuf> {
        self.snapshot_dir
            .as_ref()
            .map(|dir| dir.join(snapshot_file_name(date)))
    }
}

/// `route_table_YYYY-MM-DD.json`
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("route_table_{}.json", date.format("%Y-%m-%d"))
}
