//! Windowed chart series

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use super::SeriesField;
use crate::reading::Reading;

/// Hour:minute label format
pub const LABEL_FORMAT: &str = "%H:%M";

/// One charted sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Display label (`HH:MM`)
    pub label: String,
    /// Original instant of the reading
    pub timestamp: DateTime<Utc>,
    /// Charted values by field
    pub values: BTreeMap<SeriesField, f64>,
}

/// Chronological (oldest→newest) projection of readings for charting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Points, oldest first
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Labels in chart order
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    /// Instants in chart order
    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Values of one field in chart order; 0 where the field was not selected
    pub fn values(&self, field: SeriesField) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| p.values.get(&field).copied().unwrap_or(0.0))
            .collect()
    }
}

/// The most recent `window_size` readings, oldest first
///
/// Works for either input direction: readings are stably sorted by
/// timestamp before the oldest end is trimmed.
pub fn latest_window(readings: &[Reading], window_size: usize) -> Vec<&Reading> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let skip = ordered.len().saturating_sub(window_size);
    ordered.split_off(skip)
}

/// Build a chart series with UTC labels
///
/// A `window_size` of 0 yields an empty series.
pub fn build_series(
    readings: &[Reading],
    window_size: usize,
    fields: &[SeriesField],
) -> ChartSeries {
    build_series_with_offset(readings, window_size, fields, Utc.fix())
}

/// Build a chart series with labels rendered at a fixed UTC offset
pub fn build_series_with_offset(
    readings: &[Reading],
    window_size: usize,
    fields: &[SeriesField],
    offset: FixedOffset,
) -> ChartSeries {
    let points = latest_window(readings, window_size)
        .into_iter()
        .map(|reading| ChartPoint {
            label: reading
                .timestamp
                .with_timezone(&offset)
                .format(LABEL_FORMAT)
                .to_string(),
            timestamp: reading.timestamp,
            values: fields
                .iter()
                .map(|field| (*field, field.display_value(&reading.data)))
                .collect(),
        })
        .collect();

    ChartSeries { points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::SensorData;
    use chrono::{Duration, TimeZone};

    fn reading_at(minute: i64, humidity: f64) -> Reading {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap();
        Reading::new(
            format!("r{minute}"),
            base + Duration::minutes(minute),
            SensorData {
                humidity: Some(humidity),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_labels_are_hour_minute() {
        let readings = vec![reading_at(5, 50.0), reading_at(65, 51.0)];
        let series = build_series(&readings, 20, &[SeriesField::Humidity]);
        assert_eq!(series.labels(), vec!["14:05", "15:05"]);
    }

    #[test]
    fn test_labels_follow_offset() {
        let readings = vec![reading_at(5, 50.0)];
        let offset = FixedOffset::west_opt(6 * 3600).unwrap();
        let series = build_series_with_offset(&readings, 20, &[SeriesField::Humidity], offset);
        assert_eq!(series.labels(), vec!["08:05"]);
        assert_eq!(series.points[0].timestamp, readings[0].timestamp);
    }

    #[test]
    fn test_zero_window_is_empty() {
        let readings = vec![reading_at(0, 50.0)];
        assert!(build_series(&readings, 0, &[SeriesField::Humidity]).is_empty());
    }

    #[test]
    fn test_unselected_fields_are_not_charted() {
        let readings = vec![reading_at(0, 50.0)];
        let series = build_series(&readings, 5, &[SeriesField::Humidity]);
        assert_eq!(series.points[0].values.len(), 1);
        assert_eq!(series.values(SeriesField::Humidity), vec![50.0]);
    }
}
