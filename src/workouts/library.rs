//! Built-in workout catalog.
//!
//! Workouts are static data built once on first use and never mutated.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::types::{SegmentTarget, StructuredWorkout, WorkoutCategory, WorkoutError, WorkoutSegment};
use crate::metrics::zones::PowerRange;

static WORKOUTS: Lazy<Vec<StructuredWorkout>> = Lazy::new(build_catalog);

/// Every workout in the catalog, in display order.
pub fn all_workouts() -> &'static [StructuredWorkout] {
    &WORKOUTS
}

/// Look up a workout by id.
pub fn get_workout(id: &str) -> Option<&'static StructuredWorkout> {
    WORKOUTS.iter().find(|w| w.id == id)
}

/// Like [`get_workout`], failing with `NotFound` for an unknown id.
pub fn find_workout(id: &str) -> Result<&'static StructuredWorkout, WorkoutError> {
    get_workout(id).ok_or_else(|| WorkoutError::NotFound(id.to_string()))
}

pub fn workouts_by_category(category: WorkoutCategory) -> Vec<&'static StructuredWorkout> {
    WORKOUTS.iter().filter(|w| w.category == category).collect()
}

/// A segment resolved to absolute watts for one rider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub name: String,
    /// Offset from the workout start
    pub start_seconds: u32,
    pub duration_seconds: u32,
    pub power: PowerRange,
}

/// Absolute power targets of each segment at `ftp`.
pub fn segment_targets(workout: &StructuredWorkout, ftp: u16) -> Vec<SegmentPlan> {
    let mut offset = 0;
    workout
        .segments
        .iter()
        .map(|segment| {
            let plan = SegmentPlan {
                name: segment.name.clone(),
                start_seconds: offset,
                duration_seconds: segment.duration_seconds,
                power: segment.target.power_range(ftp),
            };
            offset += segment.duration_seconds;
            plan
        })
        .collect()
}

const MIN: u32 = 60;

fn seg(name: &str, seconds: u32, low: f64, high: f64) -> WorkoutSegment {
    WorkoutSegment::new(name, seconds, SegmentTarget::power(low, high))
}

fn warmup(minutes: u32) -> WorkoutSegment {
    seg("Warm Up", minutes * MIN, 0.45, 0.60).with_instructions("Ease in, keep cadence high")
}

fn cooldown(minutes: u32) -> WorkoutSegment {
    seg("Cool Down", minutes * MIN, 0.40, 0.50)
}

/// `count` work/rest pairs.
fn intervals(
    count: u32,
    work: (u32, f64, f64),
    rest: (u32, f64, f64),
    cadence: Option<(u16, u16)>,
) -> Vec<WorkoutSegment> {
    (1..=count)
        .flat_map(|i| {
            let mut on = seg(&format!("Interval {}", i), work.0, work.1, work.2);
            if let Some((low, high)) = cadence {
                on.target = on.target.with_cadence(low, high);
            }
            let off = seg(&format!("Recovery {}", i), rest.0, rest.1, rest.2);
            [on, off]
        })
        .collect()
}

fn build_catalog() -> Vec<StructuredWorkout> {
    vec![
        StructuredWorkout::new(
            "recovery-spin",
            "Recovery Spin",
            "Thirty easy minutes to flush the legs after a hard day",
            WorkoutCategory::Recovery,
            18.0,
            0.50,
            vec![
                seg("Easy", 5 * MIN, 0.40, 0.50),
                seg("Spin", 20 * MIN, 0.45, 0.55)
                    .with_instructions("Light gear, relaxed upper body"),
                seg("Easy", 5 * MIN, 0.40, 0.50),
            ],
        ),
        StructuredWorkout::new(
            "endurance-60",
            "Endurance Hour",
            "Steady zone 2 riding to build aerobic base",
            WorkoutCategory::Endurance,
            45.0,
            0.68,
            vec![
                warmup(10),
                seg("Endurance", 45 * MIN, 0.65, 0.75),
                cooldown(5),
            ],
        ),
        StructuredWorkout::new(
            "endurance-90-cadence",
            "Endurance with Cadence Drills",
            "Long aerobic ride with high-cadence spin-ups every 15 minutes",
            WorkoutCategory::Endurance,
            72.0,
            0.69,
            {
                let mut segments = vec![warmup(10)];
                for i in 1..=4 {
                    segments.push(seg("Endurance", 14 * MIN, 0.65, 0.75));
                    segments.push(WorkoutSegment::new(
                        format!("Spin-up {}", i),
                        MIN,
                        SegmentTarget::power(0.60, 0.70).with_cadence(105, 115),
                    ));
                }
                segments.push(seg("Endurance", 14 * MIN, 0.65, 0.75));
                segments.push(cooldown(6));
                segments
            },
        ),
        StructuredWorkout::new(
            "tempo-3x15",
            "Tempo 3x15",
            "Three long tempo blocks with short recoveries",
            WorkoutCategory::Tempo,
            68.0,
            0.80,
            [
                vec![warmup(10)],
                intervals(3, (15 * MIN, 0.76, 0.87), (5 * MIN, 0.50, 0.60), None),
                vec![cooldown(5)],
            ]
            .concat(),
        ),
        StructuredWorkout::new(
            "sweet-spot-2x20",
            "Sweet Spot 2x20",
            "Two twenty-minute sweet spot efforts",
            WorkoutCategory::SweetSpot,
            75.0,
            0.84,
            [
                vec![warmup(10)],
                intervals(2, (20 * MIN, 0.88, 0.94), (5 * MIN, 0.50, 0.60), None),
                vec![cooldown(10)],
            ]
            .concat(),
        ),
        StructuredWorkout::new(
            "sweet-spot-over-under",
            "Sweet Spot Over-Unders",
            "Alternate just under and just over threshold to train lactate clearance",
            WorkoutCategory::SweetSpot,
            80.0,
            0.87,
            {
                let mut segments = vec![warmup(10)];
                for set in 1..=3 {
                    for rep in 1..=3 {
                        segments.push(seg(&format!("Under {}.{}", set, rep), 2 * MIN, 0.88, 0.92));
                        segments.push(seg(&format!("Over {}.{}", set, rep), MIN, 1.03, 1.08));
                    }
                    segments.push(seg(&format!("Rest {}", set), 5 * MIN, 0.50, 0.55));
                }
                segments.push(cooldown(8));
                segments
            },
        ),
        StructuredWorkout::new(
            "threshold-3x10",
            "Threshold 3x10",
            "Three ten-minute efforts at FTP",
            WorkoutCategory::Threshold,
            70.0,
            0.88,
            [
                vec![warmup(12)],
                intervals(3, (10 * MIN, 0.95, 1.05), (5 * MIN, 0.50, 0.60), None),
                vec![cooldown(8)],
            ]
            .concat(),
        ),
        StructuredWorkout::new(
            "ftp-test-20",
            "20-Minute FTP Test",
            "Warm up with openers, then ride the best 20 minutes you can",
            WorkoutCategory::Threshold,
            70.0,
            0.90,
            vec![
                warmup(15),
                seg("Opener", 5 * MIN, 1.05, 1.15).with_instructions("Hard but controlled"),
                seg("Easy", 5 * MIN, 0.50, 0.55),
                seg("Test", 20 * MIN, 0.95, 1.10)
                    .with_instructions("Pace evenly, empty the tank in the last minutes"),
                cooldown(10),
            ],
        ),
        StructuredWorkout::new(
            "vo2max-5x3",
            "VO2max 5x3",
            "Five three-minute efforts above threshold",
            WorkoutCategory::Vo2max,
            62.0,
            0.85,
            [
                vec![warmup(15)],
                intervals(5, (3 * MIN, 1.10, 1.20), (3 * MIN, 0.45, 0.55), Some((95, 110))),
                vec![cooldown(10)],
            ]
            .concat(),
        ),
        StructuredWorkout::new(
            "vo2max-30-30",
            "30/30s",
            "Short on/off repeats to accumulate time near VO2max",
            WorkoutCategory::Vo2max,
            55.0,
            0.82,
            [
                vec![warmup(15)],
                intervals(12, (30, 1.20, 1.30), (30, 0.40, 0.50), None),
                vec![seg("Easy", 5 * MIN, 0.50, 0.55)],
                intervals(12, (30, 1.20, 1.30), (30, 0.40, 0.50), None),
                vec![cooldown(10)],
            ]
            .concat(),
        ),
        StructuredWorkout::new(
            "sprint-8x15",
            "Sprint Power",
            "Eight all-out 15 second sprints with full recovery",
            WorkoutCategory::Sprint,
            45.0,
            0.72,
            [
                vec![warmup(15)],
                intervals(8, (15, 1.50, 2.00), (4 * MIN + 45, 0.45, 0.55), Some((100, 130))),
                vec![cooldown(5)],
            ]
            .concat(),
        ),
    ]
}
