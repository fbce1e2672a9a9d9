//! Derived Metrics
//!
//! Turns raw sensor readings into user-facing indicators: the current
//! snapshot, a coarse air-quality score and windowed chart series.
//!
//! Everything here is a pure function of its input. Readings are taken as
//! an oldest-first slice; the last element is the current sample.

mod air_quality;
mod field;
mod series;
mod snapshot;
mod stats;

pub use air_quality::{
    air_quality_heuristic, air_quality_level, worst_gas_concentration, AirQualityLevel,
    AIR_QUALITY_BANDS, AIR_QUALITY_CLEAN, AIR_QUALITY_UNKNOWN,
};
pub use field::SeriesField;
pub use series::{
    build_series, build_series_with_offset, latest_window, ChartPoint, ChartSeries, LABEL_FORMAT,
};
pub use snapshot::{compute_snapshot, Snapshot};
pub use stats::{window_stats, FieldStats};

use crate::reading::SensorData;

/// Drop NaN and infinities, they count as absent
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// DHT temperature, else the barometric sensor's
pub(crate) fn resolved_temperature(data: &SensorData) -> Option<f64> {
    finite(data.dht_temperature).or(finite(data.bmp_temperature))
}

/// Upstream air-quality score, else the gas heuristic
///
/// `None` when neither is available.
pub(crate) fn resolved_air_quality(data: &SensorData) -> Option<f64> {
    finite(data.air_quality).or_else(|| {
        let score = air_quality_heuristic(data);
        (score != AIR_QUALITY_UNKNOWN).then_some(f64::from(score))
    })
}
