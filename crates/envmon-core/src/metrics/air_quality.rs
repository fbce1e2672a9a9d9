//! Gas-based air-quality heuristic
//!
//! A deliberately coarse step function over the worst gas concentration.
//! Not a calibrated index. The bands are part of the observable API.

use serde::{Deserialize, Serialize};

use super::finite;
use crate::reading::SensorData;

/// Score returned when no gas concentration is usable
pub const AIR_QUALITY_UNKNOWN: i32 = -1;

/// Score for a worst concentration of 50 ppm or less
pub const AIR_QUALITY_CLEAN: i32 = 95;

/// `(threshold_ppm, score)` pairs, checked in order.
/// A concentration strictly above the threshold gets the score.
pub const AIR_QUALITY_BANDS: [(f64, i32); 4] =
    [(1000.0, 20), (500.0, 40), (100.0, 60), (50.0, 80)];

/// Highest finite gas concentration of a sample
pub fn worst_gas_concentration(data: &SensorData) -> Option<f64> {
    data.gas_concentrations()
        .into_iter()
        .filter_map(finite)
        .reduce(f64::max)
}

/// Map the worst gas concentration to a 0-100 score (higher is cleaner)
///
/// Invalid or missing gases are left out rather than treated as zero, so
/// a failed sensor never makes the air look cleaner. When all five are
/// unusable the result is [`AIR_QUALITY_UNKNOWN`].
pub fn air_quality_heuristic(data: &SensorData) -> i32 {
    let Some(worst) = worst_gas_concentration(data) else {
        return AIR_QUALITY_UNKNOWN;
    };

    AIR_QUALITY_BANDS
        .iter()
        .find(|(threshold, _)| worst > *threshold)
        .map(|(_, score)| *score)
        .unwrap_or(AIR_QUALITY_CLEAN)
}

/// Display classification of an air-quality score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityLevel {
    /// 80 and above
    Good,
    /// 60 to 79
    Moderate,
    /// 40 to 59
    Poor,
    /// Below 40
    Hazardous,
    /// No usable data
    Unknown,
}

/// Classify a score for display
pub fn air_quality_level(score: f64) -> AirQualityLevel {
    match score {
        s if !s.is_finite() || s < 0.0 => AirQualityLevel::Unknown,
        s if s >= 80.0 => AirQualityLevel::Good,
        s if s >= 60.0 => AirQualityLevel::Moderate,
        s if s >= 40.0 => AirQualityLevel::Poor,
        _ => AirQualityLevel::Hazardous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_co(ppm: f64) -> SensorData {
        SensorData {
            carbon_monoxide_ppm: Some(ppm),
            ..Default::default()
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(air_quality_heuristic(&with_co(50.0)), 95);
        assert_eq!(air_quality_heuristic(&with_co(50.5)), 80);
        assert_eq!(air_quality_heuristic(&with_co(100.0)), 80);
        assert_eq!(air_quality_heuristic(&with_co(500.0)), 60);
        assert_eq!(air_quality_heuristic(&with_co(1000.0)), 40);
        assert_eq!(air_quality_heuristic(&with_co(1000.1)), 20);
    }

    #[test]
    fn test_worst_gas_wins() {
        let data = SensorData {
            alcohol_ppm: Some(10.0),
            hydrogen_ppm: Some(700.0),
            carbon_monoxide_ppm: Some(20.0),
            propane_ppm: None,
            methane_ppm: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(worst_gas_concentration(&data), Some(700.0));
        assert_eq!(air_quality_heuristic(&data), 40);
    }

    #[test]
    fn test_no_gases_is_unknown() {
        assert_eq!(air_quality_heuristic(&SensorData::default()), AIR_QUALITY_UNKNOWN);

        let broken = SensorData {
            alcohol_ppm: Some(f64::NAN),
            hydrogen_ppm: Some(f64::INFINITY),
            ..Default::default()
        };
        assert_eq!(air_quality_heuristic(&broken), AIR_QUALITY_UNKNOWN);
    }

    #[test]
    fn test_levels() {
        assert_eq!(air_quality_level(95.0), AirQualityLevel::Good);
        assert_eq!(air_quality_level(80.0), AirQualityLevel::Good);
        assert_eq!(air_quality_level(60.0), AirQualityLevel::Moderate);
        assert_eq!(air_quality_level(40.0), AirQualityLevel::Poor);
        assert_eq!(air_quality_level(20.0), AirQualityLevel::Hazardous);
        assert_eq!(air_quality_level(-1.0), AirQualityLevel::Unknown);
        assert_eq!(air_quality_level(f64::NAN), AirQualityLevel::Unknown);
    }
}
