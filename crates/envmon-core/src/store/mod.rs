//! Reading and State Stores
//!
//! The persistence collaborators behind the dashboard. Callers hold them
//! as `Arc<dyn ReadingStore>` / `Arc<dyn StateStore>` so tests can swap in
//! in-memory fakes.

mod file;
mod memory;

pub use file::{JsonStateStore, JsonlReadingStore};
pub use memory::{MemoryReadingStore, MemoryStateStore, DEFAULT_CAPACITY};

use thiserror::Error;

use crate::reading::{NewReading, Reading};
use crate::state::{StateUpdate, SystemState};

/// Errors that can occur in a store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Storage for sensor readings
pub trait ReadingStore: Send + Sync {
    /// Store one reading, assigning its id (and timestamp when absent)
    fn insert(&self, reading: NewReading) -> Result<Reading, StoreError>;

    /// The `limit` most recent readings, newest first
    fn list_recent(&self, limit: usize) -> Result<Vec<Reading>, StoreError>;

    /// Number of stored readings
    fn len(&self) -> Result<usize, StoreError>;

    /// Check if the store holds no readings
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Storage for the singleton system state
pub trait StateStore: Send + Sync {
    /// Current state
    fn get(&self) -> Result<SystemState, StoreError>;

    /// Apply an update and return the new state
    fn update(&self, update: StateUpdate) -> Result<SystemState, StoreError>;
}
