//! Training analytics over recorded workouts.
//!
//! - Workout summaries (average/max per channel)
//! - Normalized Power, work and zone counts
//! - FTP estimation from field tests
//! - Period trends and personal records
//! - [`AnalyticsEngine`] tying these to a workout repository

pub mod engine;
pub mod error;
pub mod power;
pub mod records;
pub mod summary;
pub mod trends;

pub use engine::AnalyticsEngine;
pub use error::{AnalyticsError, AnalyticsResult};
pub use power::{
    calculate_np, calculate_work, calculate_zones, estimate_ftp, TestProtocol, ZoneCounts,
};
pub use records::{find_records, PersonalRecord, RecordKind};
pub use summary::{calculate_workout_summary, WorkoutSummary};
pub use trends::{calculate_trends, period_windows, Period, PeriodWindow, TrendPoint};
