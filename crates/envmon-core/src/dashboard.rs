//! Dashboard Service
//!
//! Composes the reading and state stores with the metrics calculator.
//! Stores are injected so the same service runs against memory, files or
//! test fakes.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::metrics::{
    air_quality_level, build_series_with_offset, compute_snapshot, window_stats,
    AirQualityLevel, ChartSeries, FieldStats, SeriesField, Snapshot,
};
use crate::reading::{NewReading, Reading, ReadingError};
use crate::state::{StateUpdate, SystemState};
use crate::store::{ReadingStore, StateStore, StoreError};

/// Errors surfaced by the dashboard service
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid reading: {0}")]
    InvalidReading(#[from] ReadingError),

    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
}

/// How readings are fetched and charted
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    /// Readings fetched per refresh
    pub fetch_limit: usize,
    /// Readings kept in the chart window
    pub window_size: usize,
    /// Fields charted and summarized
    pub fields: Vec<SeriesField>,
    /// Offset used for chart labels
    pub label_offset: FixedOffset,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            fetch_limit: 50,
            window_size: 20,
            fields: SeriesField::ALL.to_vec(),
            label_offset: Utc.fix(),
        }
    }
}

/// Everything the presentation layer renders for one refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    /// Summary of the newest reading
    pub snapshot: Snapshot,
    /// Classification of `snapshot.air_quality`
    pub air_quality_level: AirQualityLevel,
    /// Chart series, oldest first
    pub series: ChartSeries,
    /// Statistics over the chart window
    pub stats: Vec<FieldStats>,
    /// Number of readings the refresh worked from
    pub reading_count: usize,
    /// When the data was computed
    pub generated_at: DateTime<Utc>,
}

/// Dashboard service over injected stores
#[derive(Clone)]
pub struct Dashboard {
    readings: Arc<dyn ReadingStore>,
    state: Arc<dyn StateStore>,
    settings: DashboardSettings,
}

impl Dashboard {
    /// Create a dashboard over the given stores
    pub fn new(
        readings: Arc<dyn ReadingStore>,
        state: Arc<dyn StateStore>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            readings,
            state,
            settings,
        }
    }

    /// Get the settings
    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Fetch the latest readings and derive the dashboard data
    ///
    /// Returns `Ok(None)` when the store holds no readings yet.
    pub fn refresh(&self) -> Result<Option<DashboardData>, DashboardError> {
        let mut readings = self.readings.list_recent(self.settings.fetch_limit)?;
        if readings.is_empty() {
            debug!("Refresh found no readings");
            return Ok(None);
        }

        // Store order is newest-first, the calculator wants oldest-first
        readings.reverse();

        let data = Self::derive(&readings, &self.settings);
        debug!(
            "Refreshed dashboard from {} readings (air quality {})",
            data.reading_count, data.snapshot.air_quality
        );
        Ok(Some(data))
    }

    /// Derive dashboard data from oldest-first readings
    pub fn derive(readings: &[Reading], settings: &DashboardSettings) -> DashboardData {
        let snapshot = compute_snapshot(readings);
        DashboardData {
            air_quality_level: air_quality_level(snapshot.air_quality),
            snapshot,
            series: build_series_with_offset(
                readings,
                settings.window_size,
                &settings.fields,
                settings.label_offset,
            ),
            stats: window_stats(readings, settings.window_size, &settings.fields),
            reading_count: readings.len(),
            generated_at: Utc::now(),
        }
    }

    /// Validate and store a reading
    pub fn record(&self, reading: NewReading) -> Result<Reading, DashboardError> {
        reading.validate()?;
        let stored = self.readings.insert(reading)?;
        debug!("Stored reading {}", stored.id);
        Ok(stored)
    }

    /// The `limit` most recent readings, newest first
    pub fn recent(&self, limit: usize) -> Result<Vec<Reading>, DashboardError> {
        Ok(self.readings.list_recent(limit)?)
    }

    /// Number of stored readings
    pub fn reading_count(&self) -> Result<usize, DashboardError> {
        Ok(self.readings.len()?)
    }

    /// Current system state
    pub fn state(&self) -> Result<SystemState, DashboardError> {
        Ok(self.state.get()?)
    }

    /// Apply a user command to the system state
    pub fn update_state(&self, update: StateUpdate) -> Result<SystemState, DashboardError> {
        let state = self.state.update(update)?;
        info!("State updated: text={:?} open={}", state.text, state.open);
        Ok(state)
    }
}
