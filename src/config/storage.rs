use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Versioned signal store
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root directory; each snapshot version lives in `<db_root_dir>/<version>`
    #[serde(default = "default_db_root_dir")]
    pub db_root_dir: PathBuf,

    /// Name of the table (sled tree) holding the signal rows
    #[serde(default = "default_signal_table")]
    pub signal_table: String,

    /// Version announced by the binary at startup as its first snapshot
    #[serde(default = "default_initial_version")]
    pub initial_version: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_root_dir: default_db_root_dir(),
            signal_table: default_signal_table(),
            initial_version: default_initial_version(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.db_root_dir.as_os_str().is_empty() {
            return Err(invalid("storage.db_root_dir cannot be empty".to_string()));
        }
        if self.signal_table.trim().is_empty() {
            return Err(invalid("storage.signal_table cannot be empty".to_string()));
        }
        if self.initial_version.trim().is_empty() || self.initial_version.contains('/') {
            return Err(invalid(format!(
                "storage.initial_version '{}' must be a non-empty directory name",
                self.initial_version
            )));
        }
        Ok(())
    }
}

fn default_db_root_dir() -> PathBuf {
    PathBuf::from("./db")
}
fn default_signal_table() -> String {
    "metadata.trace".to_string()
}
fn default_initial_version() -> String {
    "base".to_string()
}
