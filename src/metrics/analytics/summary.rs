//! Per-workout summary statistics.

use serde::{Deserialize, Serialize};

use super::power::{average, maximum};
use crate::measurements::{Measurement, Measurements};

/// Average and max per channel of one workout.
///
/// Derived from the record's measurements; never the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub avg_power: Option<f64>,
    pub max_power: Option<f64>,
    pub avg_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub avg_cadence: Option<f64>,
    pub max_cadence: Option<f64>,
    /// Samples across all channels
    pub total_data_points: usize,
}

/// Summarize a set of measurement series. Empty channels yield `None`.
pub fn calculate_workout_summary(measurements: &Measurements) -> WorkoutSummary {
    let (avg_power, max_power) = channel_stats(&measurements.power);
    let (avg_heartrate, max_heartrate) = channel_stats(&measurements.heartrate);
    let (avg_cadence, max_cadence) = channel_stats(&measurements.cadence);

    WorkoutSummary {
        avg_power,
        max_power,
        avg_heartrate,
        max_heartrate,
        avg_cadence,
        max_cadence,
        total_data_points: measurements.total_len(),
    }
}

fn channel_stats(series: &[Measurement]) -> (Option<f64>, Option<f64>) {
    let values: Vec<f64> = series.iter().map(|m| m.value).collect();
    (average(&values), maximum(&values))
}
