//! Store configuration types.
//!
//! `StoreConfig` represents the optional `botbase.toml` that sits next to the
//! store file and tunes the SQLite connection pools.

use serde::{Deserialize, Serialize};

/// Environment variable holding the store file path.
pub const STORE_PATH_ENV: &str = "BOTBASE_DB_PATH";

/// Name of the optional config file, looked up in the store's directory.
pub const CONFIG_FILE_NAME: &str = "botbase.toml";

/// Connection settings for the store. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// How long a write waits on another process's lock before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,

    /// Connections in the read-only pool.
    #[serde(default = "default_max_readers")]
    pub max_readers: u32,
}

fn default_busy_timeout_secs() -> u64 {
    5
}

fn default_max_readers() -> u32 {
    4
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_secs: default_busy_timeout_secs(),
            max_readers: default_max_readers(),
        }
    }
}
