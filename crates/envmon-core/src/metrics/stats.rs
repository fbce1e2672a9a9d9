//! Statistics over the charted window

use serde::{Deserialize, Serialize};

use super::{latest_window, SeriesField};
use crate::reading::Reading;

/// Statistics for one field over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Field the statistics describe
    pub field: SeriesField,
    /// Number of readings that carried the field
    pub count: usize,
    /// Minimum value
    pub min: Option<f64>,
    /// Maximum value
    pub max: Option<f64>,
    /// Average value
    pub avg: Option<f64>,
    /// Value in the newest reading that carried the field
    pub latest: Option<f64>,
}

impl FieldStats {
    fn collect(field: SeriesField, values: &[f64]) -> Self {
        let count = values.len();
        let (min, max, avg) = if count == 0 {
            (None, None, None)
        } else {
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let avg = values.iter().sum::<f64>() / count as f64;
            (Some(min), Some(max), Some(avg))
        };

        Self {
            field,
            count,
            min,
            max,
            avg,
            latest: values.last().copied(),
        }
    }
}

/// Summary statistics of the most recent `window_size` readings
///
/// Absent or non-finite values are left out; they are never counted as 0.
/// For [`SeriesField::Rain`] the average is the wet fraction of the window.
pub fn window_stats(
    readings: &[Reading],
    window_size: usize,
    fields: &[SeriesField],
) -> Vec<FieldStats> {
    let window = latest_window(readings, window_size);

    fields
        .iter()
        .map(|field| {
            let values: Vec<f64> = window.iter().filter_map(|r| field.value(&r.data)).collect();
            FieldStats::collect(*field, &values)
        })
        .collect()
}
