//! Configuration
//!
//! Runtime settings stored as JSON. Every field has a default, so a
//! partial file (or none at all) is valid.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dashboard::DashboardSettings;
use crate::metrics::SeriesField;
use crate::store::{
    JsonStateStore, JsonlReadingStore, MemoryReadingStore, MemoryStateStore, ReadingStore,
    StateStore, StoreError, DEFAULT_CAPACITY,
};

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "ENVMON_CONFIG";

/// Reading log file name inside a storage directory
pub const READINGS_FILE: &str = "readings.jsonl";

/// State file name inside a storage directory
pub const STATE_FILE: &str = "state.json";

/// Largest accepted `demo.backfill`
pub const MAX_DEMO_BACKFILL: usize = 100_000;

/// Largest accepted `demo.interval_ms` (one day)
pub const MAX_DEMO_INTERVAL_MS: u64 = 86_400_000;

/// Errors that can occur loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

/// Where readings and state are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageConfig {
    /// Keep everything in memory
    #[default]
    Memory,
    /// Persist under a directory
    File {
        /// Directory holding `readings.jsonl` and `state.json`
        dir: PathBuf,
    },
}

impl StorageConfig {
    /// Open the stores this configuration describes
    pub fn open(
        &self,
        capacity: usize,
    ) -> Result<(Arc<dyn ReadingStore>, Arc<dyn StateStore>), StoreError> {
        match self {
            StorageConfig::Memory => Ok((
                Arc::new(MemoryReadingStore::new(capacity)),
                Arc::new(MemoryStateStore::default()),
            )),
            StorageConfig::File { dir } => {
                fs::create_dir_all(dir)?;
                let readings = JsonlReadingStore::open(dir.join(READINGS_FILE), capacity)?;
                let state = JsonStateStore::open(dir.join(STATE_FILE))?;
                Ok((Arc::new(readings), Arc::new(state)))
            }
        }
    }
}

/// Simulated sensor feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Feed simulated readings into the store
    pub enabled: bool,

    /// Milliseconds between simulated readings
    pub interval_ms: u64,

    /// Seed for reproducible runs
    pub seed: Option<u64>,

    /// Readings generated at startup so charts are not empty
    pub backfill: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 60_000,
            seed: None,
            backfill: 60,
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP API listens on
    pub bind: String,

    /// Milliseconds between dashboard refreshes
    pub poll_interval_ms: u64,

    /// Readings fetched per refresh
    pub fetch_limit: usize,

    /// Readings kept in the chart window
    pub window_size: usize,

    /// Fields charted and summarized
    pub chart_fields: Vec<SeriesField>,

    /// Offset of chart labels from UTC, in minutes
    pub label_utc_offset_minutes: i32,

    /// Storage backend
    pub storage: StorageConfig,

    /// Maximum readings kept in memory
    pub memory_capacity: usize,

    /// Demo feed settings
    pub demo: DemoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            poll_interval_ms: 5000,
            fetch_limit: 50,
            window_size: 20,
            chart_fields: SeriesField::ALL.to_vec(),
            label_utc_offset_minutes: 0,
            storage: StorageConfig::default(),
            memory_capacity: DEFAULT_CAPACITY,
            demo: DemoConfig::default(),
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("envmon").join("config.json"))
    }

    /// Load a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve and load the configuration
    ///
    /// Order: `explicit` path, then `ENVMON_CONFIG`, then the default
    /// location if the file exists, then built-in defaults. An explicit or
    /// environment path that does not exist is an error.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let requested = explicit.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));
        if let Some(path) = requested {
            return Ok((Self::load(&path)?, Some(path)));
        }

        match Self::default_path().filter(|p| p.exists()) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Write the config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_ms",
                message: "must be positive".to_string(),
            });
        }
        if self.window_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window_size",
                message: "must be positive".to_string(),
            });
        }
        if self.fetch_limit < self.window_size {
            return Err(ConfigError::InvalidValue {
                field: "fetch_limit",
                message: format!("must be at least window_size ({})", self.window_size),
            });
        }
        if self.demo.backfill > MAX_DEMO_BACKFILL {
            return Err(ConfigError::InvalidValue {
                field: "demo.backfill",
                message: format!("must be at most {}", MAX_DEMO_BACKFILL),
            });
        }
        if self.demo.interval_ms > MAX_DEMO_INTERVAL_MS {
            return Err(ConfigError::InvalidValue {
                field: "demo.interval_ms",
                message: format!("must be at most {}", MAX_DEMO_INTERVAL_MS),
            });
        }
        if self.demo.enabled && self.demo.interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "demo.interval_ms",
                message: "must be positive".to_string(),
            });
        }
        self.label_offset()?;
        Ok(())
    }

    /// Chart label offset
    pub fn label_offset(&self) -> Result<FixedOffset, ConfigError> {
        let seconds = self.label_utc_offset_minutes.checked_mul(60);
        seconds.and_then(FixedOffset::east_opt).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "label_utc_offset_minutes",
                message: format!("{} is not a valid offset", self.label_utc_offset_minutes),
            }
        })
    }

    /// Refresh period of the poller
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Settings for the dashboard service
    pub fn dashboard_settings(&self) -> Result<DashboardSettings, ConfigError> {
        Ok(DashboardSettings {
            fetch_limit: self.fetch_limit,
            window_size: self.window_size,
            fields: self.chart_fields.clone(),
            label_offset: self.label_offset()?,
        })
    }
}
