//! Sensor Readings
//!
//! The reading model shared by the stores, the metrics calculator and the
//! HTTP API. Field names on the wire follow the device payload
//! (`ppm_co`, `temp_dht`, `lluvia`, ...).
//!
//! Numeric fields decode leniently: `null`, non-numeric strings and
//! non-finite numbers become `None` instead of failing the whole reading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised when a reading fails boundary validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    #[error("Value out of range for '{field}': {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Measurements carried by one sensor sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorData {
    /// Alcohol concentration (ppm)
    #[serde(rename = "ppm_alcohol", default, deserialize_with = "lenient_f64")]
    pub alcohol_ppm: Option<f64>,
    /// Hydrogen concentration (ppm)
    #[serde(rename = "ppm_h2", default, deserialize_with = "lenient_f64")]
    pub hydrogen_ppm: Option<f64>,
    /// Carbon monoxide concentration (ppm)
    #[serde(rename = "ppm_co", default, deserialize_with = "lenient_f64")]
    pub carbon_monoxide_ppm: Option<f64>,
    /// Propane concentration (ppm)
    #[serde(rename = "ppm_propano", default, deserialize_with = "lenient_f64")]
    pub propane_ppm: Option<f64>,
    /// Methane concentration (ppm)
    #[serde(rename = "ppm_ch4", default, deserialize_with = "lenient_f64")]
    pub methane_ppm: Option<f64>,

    /// Luminosity (lux)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lux: Option<f64>,
    /// Temperature from the barometric sensor (°C)
    #[serde(rename = "temp_bmp", default, deserialize_with = "lenient_f64")]
    pub bmp_temperature: Option<f64>,
    /// Barometric pressure (Pa)
    #[serde(rename = "pres", default, deserialize_with = "lenient_f64")]
    pub pressure: Option<f64>,
    /// Altitude (m)
    #[serde(rename = "alt", default, deserialize_with = "lenient_f64")]
    pub altitude: Option<f64>,
    /// Relative humidity (%)
    #[serde(rename = "hum", default, deserialize_with = "lenient_f64")]
    pub humidity: Option<f64>,
    /// Temperature from the DHT sensor (°C)
    #[serde(rename = "temp_dht", default, deserialize_with = "lenient_f64")]
    pub dht_temperature: Option<f64>,

    /// Rain detected (true = wet)
    #[serde(rename = "lluvia", default, deserialize_with = "lenient_bool")]
    pub rain: bool,
    /// System open flag as reported by the device
    #[serde(default, deserialize_with = "lenient_bool")]
    pub open: bool,

    /// Air-quality score computed upstream (0-100)
    #[serde(default, deserialize_with = "lenient_f64")]
    pub air_quality: Option<f64>,
    /// Free-text rain intensity label
    #[serde(default)]
    pub rain_intensity: Option<String>,
    /// Daytime flag computed upstream
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub is_day: Option<bool>,
    /// Anomaly flag computed upstream
    #[serde(default, deserialize_with = "lenient_opt_bool")]
    pub anomaly: Option<bool>,
    /// Alert text computed upstream
    #[serde(default)]
    pub alerts: Option<String>,
}

impl SensorData {
    /// The five gas concentrations, in a fixed order
    /// (alcohol, hydrogen, CO, propane, methane)
    pub fn gas_concentrations(&self) -> [Option<f64>; 5] {
        [
            self.alcohol_ppm,
            self.hydrogen_ppm,
            self.carbon_monoxide_ppm,
            self.propane_ppm,
            self.methane_ppm,
        ]
    }

    /// Check the measurement ranges
    ///
    /// Absent fields always pass; they are "unknown", not wrong.
    pub fn validate(&self) -> Result<(), ReadingError> {
        let gases = [
            ("ppm_alcohol", self.alcohol_ppm),
            ("ppm_h2", self.hydrogen_ppm),
            ("ppm_co", self.carbon_monoxide_ppm),
            ("ppm_propano", self.propane_ppm),
            ("ppm_ch4", self.methane_ppm),
        ];
        for (field, value) in gases {
            check(field, value, |v| v >= 0.0)?;
        }

        check("lux", self.lux, |v| v >= 0.0)?;
        check("pres", self.pressure, |v| v > 0.0)?;
        check("hum", self.humidity, |v| (0.0..=100.0).contains(&v))?;
        check("air_quality", self.air_quality, |v| (0.0..=100.0).contains(&v))
    }
}

fn check(
    field: &'static str,
    value: Option<f64>,
    ok: impl Fn(f64) -> bool,
) -> Result<(), ReadingError> {
    match value {
        Some(v) if !ok(v) => Err(ReadingError::OutOfRange { field, value: v }),
        _ => Ok(()),
    }
}

/// A stored sensor reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Opaque identifier assigned by the store
    pub id: String,
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
    /// Measurements
    #[serde(flatten)]
    pub data: SensorData,
}

impl Reading {
    /// Create a reading from its parts
    pub fn new(id: impl Into<String>, timestamp: DateTime<Utc>, data: SensorData) -> Self {
        Self {
            id: id.into(),
            timestamp,
            data,
        }
    }
}

/// Insert payload for a reading that has not been stored yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    /// Device timestamp; the store assigns one when absent
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Measurements
    #[serde(flatten)]
    pub data: SensorData,
}

impl NewReading {
    /// Create an insert payload without a timestamp
    pub fn new(data: SensorData) -> Self {
        Self {
            timestamp: None,
            data,
        }
    }

    /// Set the device timestamp
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Validate at the system boundary
    pub fn validate(&self) -> Result<(), ReadingError> {
        self.data.validate()
    }

    /// Turn the payload into a stored reading
    pub fn into_reading(self, id: impl Into<String>, now: DateTime<Utc>) -> Reading {
        Reading::new(id, self.timestamp.unwrap_or(now), self.data)
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn bool_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_bool(deserializer)?.unwrap_or(false))
}

fn lenient_opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(bool_from_value))
}
