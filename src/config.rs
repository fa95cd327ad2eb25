use crate::database::{StorageTarget, DEFAULT_DB_FILE};
use anyhow::{anyhow, Result};
use config::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct StoreConfig {
    /// Path to the SQLite file holding the prediction tables
    pub db_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_FILE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Build the configuration from an optional TOML file and the environment
    ///
    /// Without an explicit path, `$HOME/.store-results/store-results.toml` is
    /// read if it exists. Settings from `STORE_RESULTS_*` environment variables
    /// take precedence, e.g. `STORE_RESULTS_DB_PATH=/tmp/p.db store-results`.
    /// No file or directory is ever created here.
    pub fn new(path: &Option<String>) -> Result<StoreConfig> {
        let mut builder = Config::builder();

        match path {
            Some(p) => {
                let path = Path::new(p.as_str());
                if !path.exists() {
                    return Err(anyhow!("Config file '{}' does not exist", p));
                }
                builder = builder.add_source(config::File::from(path));
            }
            None => {
                if let Some(p) = Self::config_file_path().filter(|p| p.exists()) {
                    builder = builder.add_source(config::File::from(p));
                }
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("STORE_RESULTS"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let config = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let db_path = match config.get("db_path") {
            Some(p) if !p.trim().is_empty() => p.clone(),
            Some(_) => return Err(anyhow!("db_path must not be empty")),
            None => DEFAULT_DB_FILE.to_string(),
        };

        Ok(StoreConfig { db_path })
    }

    /// Default location of the config file
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".store-results").join("store-results.toml"))
    }

    pub fn storage_target(&self) -> StorageTarget {
        StorageTarget::file(self.db_path.as_str())
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let config_file = Self::config_file_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.store-results/store-results.toml".to_string());

        [
            format!("Database Path:      {}", self.db_path),
            format!("Config File:        {}", config_file),
        ]
        .join("\n")
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
