//! Current-reading snapshot

use serde::{Deserialize, Serialize};

use super::air_quality::air_quality_heuristic;
use super::{finite, resolved_temperature};
use crate::reading::Reading;
use crate::unit_conversion::pa_to_hpa;

/// Summary of the most recent reading
///
/// Recomputed on every refresh, never stored. Numeric fields are 0 when
/// the reading lacks them; `air_quality` is -1 when it cannot be derived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// °C, DHT preferred over the barometric sensor
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Pressure (hPa)
    pub pressure: f64,
    /// Luminosity (lux)
    pub light_intensity: f64,
    /// 0-100 score, or -1 when unknown
    pub air_quality: f64,
    /// Rain detected
    pub rain_detected: bool,
    /// Anomaly flagged upstream
    pub anomaly: bool,
    /// Alert text from upstream
    pub alert_text: String,
}

impl Snapshot {
    /// Whether `air_quality` holds a real score
    pub fn air_quality_known(&self) -> bool {
        self.air_quality >= 0.0
    }
}

/// Build the snapshot of the latest reading
///
/// `readings` is oldest-first; the last element is the current sample.
/// An empty slice gives the all-zero default.
pub fn compute_snapshot(readings: &[Reading]) -> Snapshot {
    let Some(latest) = readings.last() else {
        return Snapshot::default();
    };
    let data = &latest.data;

    // heuristic yields AIR_QUALITY_UNKNOWN (-1) when no gas is usable
    let air_quality =
        finite(data.air_quality).unwrap_or_else(|| f64::from(air_quality_heuristic(data)));

    Snapshot {
        temperature: resolved_temperature(data).unwrap_or(0.0),
        humidity: finite(data.humidity).unwrap_or(0.0),
        pressure: finite(data.pressure).map(pa_to_hpa).unwrap_or(0.0),
        light_intensity: finite(data.lux).unwrap_or(0.0),
        air_quality,
        rain_detected: data.rain,
        anomaly: data.anomaly.unwrap_or(false),
        alert_text: data.alerts.clone().unwrap_or_default(),
    }
}
