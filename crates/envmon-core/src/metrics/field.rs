//! Chartable reading fields

use serde::{Deserialize, Serialize};

use super::{finite, resolved_air_quality, resolved_temperature};
use crate::reading::SensorData;
use crate::unit_conversion::pa_to_hpa;

/// Field selector for chart series and window statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesField {
    /// Alcohol concentration (ppm)
    Alcohol,
    /// Hydrogen concentration (ppm)
    Hydrogen,
    /// Carbon monoxide concentration (ppm)
    CarbonMonoxide,
    /// Propane concentration (ppm)
    Propane,
    /// Methane concentration (ppm)
    Methane,
    /// Luminosity (lux)
    Lux,
    /// Display temperature: DHT, else barometric (°C)
    Temperature,
    /// Barometric sensor temperature (°C)
    BmpTemperature,
    /// DHT sensor temperature (°C)
    DhtTemperature,
    /// Pressure, charted in hPa
    Pressure,
    /// Altitude (m)
    Altitude,
    /// Relative humidity (%)
    Humidity,
    /// Rain: 1 = wet, 0 = dry
    Rain,
    /// Air-quality score, upstream or heuristic
    AirQuality,
}

impl SeriesField {
    /// Every selectable field
    pub const ALL: [SeriesField; 14] = [
        SeriesField::Alcohol,
        SeriesField::Hydrogen,
        SeriesField::CarbonMonoxide,
        SeriesField::Propane,
        SeriesField::Methane,
        SeriesField::Lux,
        SeriesField::Temperature,
        SeriesField::BmpTemperature,
        SeriesField::DhtTemperature,
        SeriesField::Pressure,
        SeriesField::Altitude,
        SeriesField::Humidity,
        SeriesField::Rain,
        SeriesField::AirQuality,
    ];

    /// The five gas concentrations
    pub const GASES: [SeriesField; 5] = [
        SeriesField::Alcohol,
        SeriesField::Hydrogen,
        SeriesField::CarbonMonoxide,
        SeriesField::Propane,
        SeriesField::Methane,
    ];

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            SeriesField::Alcohol
            | SeriesField::Hydrogen
            | SeriesField::CarbonMonoxide
            | SeriesField::Propane
            | SeriesField::Methane => "ppm",
            SeriesField::Lux => "lx",
            SeriesField::Temperature
            | SeriesField::BmpTemperature
            | SeriesField::DhtTemperature => "°C",
            SeriesField::Pressure => "hPa",
            SeriesField::Altitude => "m",
            SeriesField::Humidity => "%",
            SeriesField::Rain | SeriesField::AirQuality => "",
        }
    }

    /// Value of this field in a sample, `None` when absent or not finite
    pub fn value(&self, data: &SensorData) -> Option<f64> {
        match self {
            SeriesField::Alcohol => finite(data.alcohol_ppm),
            SeriesField::Hydrogen => finite(data.hydrogen_ppm),
            SeriesField::CarbonMonoxide => finite(data.carbon_monoxide_ppm),
            SeriesField::Propane => finite(data.propane_ppm),
            SeriesField::Methane => finite(data.methane_ppm),
            SeriesField::Lux => finite(data.lux),
            SeriesField::Temperature => resolved_temperature(data),
            SeriesField::BmpTemperature => finite(data.bmp_temperature),
            SeriesField::DhtTemperature => finite(data.dht_temperature),
            SeriesField::Pressure => finite(data.pressure).map(pa_to_hpa),
            SeriesField::Altitude => finite(data.altitude),
            SeriesField::Humidity => finite(data.humidity),
            SeriesField::Rain => Some(if data.rain { 1.0 } else { 0.0 }),
            SeriesField::AirQuality => resolved_air_quality(data),
        }
    }

    /// Value for display: absent becomes 0
    pub fn display_value(&self, data: &SensorData) -> f64 {
        self.value(data).unwrap_or(0.0)
    }
}
