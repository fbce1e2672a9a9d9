//! In-memory stores
//!
//! Used in development and demo mode, and as the cache behind the file
//! stores.

use std::collections::VecDeque;
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use uuid::Uuid;

use super::{ReadingStore, StateStore, StoreError};
use crate::reading::{NewReading, Reading};
use crate::state::{StateUpdate, SystemState};

/// Maximum readings to keep before the oldest are dropped
pub const DEFAULT_CAPACITY: usize = 10000;

/// Bounded reading buffer ordered by timestamp
pub struct MemoryReadingStore {
    /// Readings, oldest first
    buffer: RwLock<VecDeque<Reading>>,
    /// Maximum number of readings kept
    capacity: usize,
}

impl MemoryReadingStore {
    /// Create an empty store holding at most `capacity` readings
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    /// Create a store pre-filled with readings
    pub fn with_readings(capacity: usize, readings: impl IntoIterator<Item = Reading>) -> Self {
        let store = Self::new(capacity);
        if let Ok(mut buffer) = store.buffer.write() {
            for reading in readings {
                push_ordered(&mut buffer, reading, store.capacity);
            }
        }
        store
    }

    /// Get the capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `reading` would survive insertion into a full buffer
    pub(crate) fn retains(&self, reading: &Reading) -> Result<bool, StoreError> {
        let buffer = self.buffer.read().map_err(|_| StoreError::Poisoned)?;
        Ok(buffer.len() < self.capacity
            || buffer
                .front()
                .map_or(true, |oldest| reading.timestamp >= oldest.timestamp))
    }

    /// All readings, oldest first
    pub(crate) fn all(&self) -> Result<Vec<Reading>, StoreError> {
        let buffer = self.buffer.read().map_err(|_| StoreError::Poisoned)?;
        Ok(buffer.iter().cloned().collect())
    }

    /// Store an already-identified reading
    pub(crate) fn push(&self, reading: Reading) -> Result<(), StoreError> {
        let mut buffer = self.buffer.write().map_err(|_| StoreError::Poisoned)?;
        push_ordered(&mut buffer, reading, self.capacity);
        Ok(())
    }
}

impl Default for MemoryReadingStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Insert keeping timestamp order; equal timestamps keep arrival order
fn push_ordered(buffer: &mut VecDeque<Reading>, reading: Reading, capacity: usize) {
    let at = buffer.partition_point(|r| r.timestamp <= reading.timestamp);
    buffer.insert(at, reading);

    while buffer.len() > capacity {
        buffer.pop_front();
    }
}

impl ReadingStore for MemoryReadingStore {
    fn insert(&self, reading: NewReading) -> Result<Reading, StoreError> {
        let reading = reading.into_reading(Uuid::new_v4().to_string(), Utc::now());
        self.push(reading.clone())?;
        Ok(reading)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Reading>, StoreError> {
        let buffer = self.buffer.read().map_err(|_| StoreError::Poisoned)?;
        Ok(buffer.iter().rev().take(limit).cloned().collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        let buffer = self.buffer.read().map_err(|_| StoreError::Poisoned)?;
        Ok(buffer.len())
    }
}

/// State held in memory, lost on restart
#[derive(Default)]
pub struct MemoryStateStore {
    state: Mutex<SystemState>,
}

impl MemoryStateStore {
    /// Create a store with an initial state
    pub fn new(state: SystemState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self) -> Result<SystemState, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state.clone())
    }

    fn update(&self, update: StateUpdate) -> Result<SystemState, StoreError> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        state.apply(update);
        Ok(state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::SensorData;
    use chrono::{Duration, TimeZone};

    fn new_at(minute: i64) -> NewReading {
        NewReading::new(SensorData {
            lux: Some(minute as f64),
            ..Default::default()
        })
        .at(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::minutes(minute))
    }

    #[test]
    fn test_store_basic() {
        let store = MemoryReadingStore::default();
        assert!(store.is_empty().unwrap());

        let stored = store.insert(new_at(0)).unwrap();
        assert!(!stored.id.is_empty());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_list_recent_is_newest_first() {
        let store = MemoryReadingStore::default();
        for minute in [3, 1, 2, 0] {
            store.insert(new_at(minute)).unwrap();
        }

        let recent = store.list_recent(3).unwrap();
        let lux: Vec<f64> = recent.iter().filter_map(|r| r.data.lux).collect();
        assert_eq!(lux, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let store = MemoryReadingStore::new(2);
        for minute in 0..5 {
            store.insert(new_at(minute)).unwrap();
        }

        assert_eq!(store.len().unwrap(), 2);
        let lux: Vec<f64> = store
            .list_recent(10)
            .unwrap()
            .iter()
            .filter_map(|r| r.data.lux)
            .collect();
        assert_eq!(lux, vec![4.0, 3.0]);
    }

    #[test]
    fn test_state_store_merges_updates() {
        let store = MemoryStateStore::default();
        let updated = store
            .update(StateUpdate {
                open: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert!(updated.open);
        assert_eq!(store.get().unwrap(), updated);
    }
}
