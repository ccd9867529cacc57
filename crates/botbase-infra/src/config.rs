//! Startup configuration for Botbase.
//!
//! The store location comes from `BOTBASE_DB_PATH` (or `--db`) and is checked
//! up front so the process fails fast with a clear message. Connection tuning
//! is read from an optional `botbase.toml` in the store's directory and falls
//! back to defaults when the file is missing or malformed.

use std::path::{Path, PathBuf};

use botbase_types::config::{CONFIG_FILE_NAME, STORE_PATH_ENV, StoreConfig};
use botbase_types::error::ConfigError;

/// Validate the configured store location.
///
/// The file itself may not exist yet (it is created on open), but its parent
/// directory must.
pub fn resolve_store_location(location: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    let path = location
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConfigError::MissingLocation(STORE_PATH_ENV))?;

    if path.is_dir() {
        return Err(ConfigError::IsDirectory(path.display().to_string()));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(ConfigError::MissingParent(path.display().to_string()));
        }
    }

    Ok(path)
}

/// Directory searched for `botbase.toml`: the store file's parent.
pub fn config_dir(store_location: &Path) -> PathBuf {
    match store_location.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Load store configuration from `{dir}/botbase.toml`.
///
/// A missing file means defaults. An unreadable or malformed file is logged
/// and also falls back to defaults. `max_readers = 0` is raised to 1.
pub async fn load_store_config(dir: &Path) -> StoreConfig {
    let config_path = dir.join(CONFIG_FILE_NAME);

    let config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => parse_store_config(&config_path, &content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreConfig::default(),
        Err(err) => {
            tracing::warn!(path = %config_path.display(), error = %err, "cannot read store config, using defaults");
            StoreConfig::default()
        }
    };

    tracing::debug!(
        path = %config_path.display(),
        busy_timeout_secs = config.busy_timeout_secs,
        max_readers = config.max_readers,
        "store config resolved"
    );
    config
}

fn parse_store_config(path: &Path, content: &str) -> StoreConfig {
    match toml::from_str::<StoreConfig>(content) {
        Ok(config) if config.max_readers == 0 => {
            tracing::warn!(path = %path.display(), "max_readers = 0 leaves no read connection, using 1");
            StoreConfig {
                max_readers: 1,
                ..config
            }
        }
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "malformed store config, using defaults");
            StoreConfig::default()
        }
    }
}
