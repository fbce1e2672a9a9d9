//! File-backed stores
//!
//! Readings are appended as JSON lines; the state is one pretty-printed
//! JSON document rewritten on every update.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::memory::MemoryReadingStore;
use super::{ReadingStore, StateStore, StoreError};
use crate::reading::{NewReading, Reading};
use crate::state::{StateUpdate, SystemState};

/// Reading log stored as one JSON object per line
pub struct JsonlReadingStore {
    path: PathBuf,
    file: Mutex<File>,
    cache: MemoryReadingStore,
}

impl JsonlReadingStore {
    /// Open (or create) a reading log
    ///
    /// Existing lines are loaded into memory, keeping at most `capacity`
    /// of the newest. Lines that fail to parse are skipped. When readings
    /// had to be dropped the file is rewritten with the retained ones.
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let cache = MemoryReadingStore::new(capacity);
        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let mut loaded = 0usize;
            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Reading>(&line) {
                    Ok(reading) => {
                        cache.push(reading)?;
                        loaded += 1;
                    }
                    Err(e) => warn!("Skipping malformed reading on line {}: {}", index + 1, e),
                }
            }
            debug!("Loaded {} readings from {}", loaded, path.display());

            let retained = cache.len()?;
            if loaded > retained {
                compact(&path, &cache.all()?)?;
                info!(
                    "Compacted {} to its {} newest readings",
                    path.display(),
                    retained
                );
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
            cache,
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Rewrite the log with `readings`, replacing the old file atomically
fn compact(path: &Path, readings: &[Reading]) -> Result<(), StoreError> {
    let tmp = path.with_extension("jsonl.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        for reading in readings {
            serde_json::to_writer(&mut writer, reading)?;
            writeln!(writer)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

impl ReadingStore for JsonlReadingStore {
    fn insert(&self, reading: NewReading) -> Result<Reading, StoreError> {
        let reading = reading.into_reading(Uuid::new_v4().to_string(), Utc::now());

        let mut file = self.file.lock().map_err(|_| StoreError::Poisoned)?;
        // Older than everything a full cache holds: it would be dropped at once
        if !self.cache.retains(&reading)? {
            debug!("Reading {} is older than the retained window, not logged", reading.id);
            return Ok(reading);
        }

        let line = serde_json::to_string(&reading)?;
        writeln!(file, "{}", line)?;
        file.flush()?;

        self.cache.push(reading.clone())?;
        Ok(reading)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Reading>, StoreError> {
        self.cache.list_recent(limit)
    }

    fn len(&self) -> Result<usize, StoreError> {
        self.cache.len()
    }
}

/// State persisted to a JSON file
pub struct JsonStateStore {
    path: PathBuf,
    state: Mutex<SystemState>,
}

impl JsonStateStore {
    /// Open a state file, starting from the default state when missing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            SystemState::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, state: &SystemState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    fn get(&self) -> Result<SystemState, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.clone())
    }

    fn update(&self, update: StateUpdate) -> Result<SystemState, StoreError> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = state.clone();
        next.apply(update);

        // Only replace the cached state once it is on disk
        self.save(&next)?;
        *state = next.clone();
        Ok(next)
    }
}
