//! # envmon Core Library
//!
//! Core functionality for the envmon environmental sensor dashboard.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - The sensor reading model and boundary validation
//! - Derived metrics: current snapshot, air-quality heuristic, chart series
//! - Reading and state stores (in-memory and file-backed)
//! - A dashboard service and a background poller
//! - A demo sensor that generates realistic readings
//!
//! ## Example
//!
//! ```rust,ignore
//! use envmon_core::metrics::{build_series, compute_snapshot, SeriesField};
//!
//! // Oldest-first readings, the last one is the current sample
//! let snapshot = compute_snapshot(&readings);
//! println!("Air quality: {}", snapshot.air_quality);
//!
//! let series = build_series(&readings, 20, &[SeriesField::Temperature]);
//! ```

pub mod config;
pub mod dashboard;
pub mod demo;
pub mod metrics;
pub mod poller;
pub mod reading;
pub mod state;
pub mod store;
pub mod unit_conversion;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, DemoConfig, StorageConfig};
    pub use crate::dashboard::{Dashboard, DashboardData, DashboardError, DashboardSettings};
    pub use crate::demo::DemoSensor;
    pub use crate::metrics::{
        air_quality_heuristic, build_series, compute_snapshot, window_stats, ChartSeries,
        SeriesField, Snapshot,
    };
    pub use crate::poller::{DashboardView, Poller};
    pub use crate::reading::{NewReading, Reading, ReadingError};
    pub use crate::state::{StateUpdate, SystemState};
    pub use crate::store::{
        JsonStateStore, JsonlReadingStore, MemoryReadingStore, MemoryStateStore, ReadingStore,
        StateStore, StoreError,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
