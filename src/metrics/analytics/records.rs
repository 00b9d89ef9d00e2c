//! Personal bests across workout history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::power::calculate_np;
use crate::recording::WorkoutRecord;

/// Shortest workout that counts toward the 20-minute record.
pub const TWENTY_MINUTES_SECONDS: i64 = 20 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    /// Highest single power sample
    MaxPower,
    /// Best average power of a workout lasting 20 minutes or more
    TwentyMinutePower,
    /// Best normalized power of a workout
    NormalizedPower,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::MaxPower,
        RecordKind::TwentyMinutePower,
        RecordKind::NormalizedPower,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::MaxPower => "Max power",
            RecordKind::TwentyMinutePower => "20 min power",
            RecordKind::NormalizedPower => "Normalized power",
        }
    }
}

/// A best value with the workout it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub kind: RecordKind,
    /// Watts
    pub value: f64,
    pub achieved_at: DateTime<Utc>,
    pub workout_id: Uuid,
}

/// Find personal records among completed workouts.
///
/// Kinds with no qualifying workout are left out, so an empty history gives
/// an empty list. On ties the earlier entry in `records` wins.
pub fn find_records(records: &[WorkoutRecord]) -> Vec<PersonalRecord> {
    let mut best: [Option<PersonalRecord>; 3] = [None, None, None];

    for record in records.iter().filter(|r| r.is_completed()) {
        let summary = record.summary_or_compute();
        let power = record.measurements.power_values();

        let candidates = [
            summary.max_power,
            summary
                .avg_power
                .filter(|_| record.duration_seconds() >= TWENTY_MINUTES_SECONDS),
            (!power.is_empty()).then(|| calculate_np(&power)),
        ];

        for ((slot, kind), value) in best.iter_mut().zip(RecordKind::ALL).zip(candidates) {
            let Some(value) = value else {
                continue;
            };
            if slot.as_ref().map_or(true, |current| value > current.value) {
                *slot = Some(PersonalRecord {
                    kind,
                    value,
                    achieved_at: record.start_time,
                    workout_id: record.id,
                });
            }
        }
    }

    best.into_iter().flatten().collect()
}
