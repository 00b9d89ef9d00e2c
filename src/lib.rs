//! Spinlab - cycling workout tracking core
//!
//! Ingests live power, heart rate and cadence samples, drives structured
//! workouts segment by segment with FTP-relative targets, records sessions
//! and computes training analytics over the stored history.

pub mod measurements;
pub mod metrics;
pub mod recording;
pub mod storage;
pub mod workouts;

// Re-export commonly used types
pub use measurements::{Measurement, MeasurementStore};
pub use metrics::analytics::AnalyticsEngine;
pub use recording::{RideSession, WorkoutRecord, WorkoutRepository};
pub use storage::{AppConfig, Database};
pub use workouts::{ExecutionController, WorkoutRunner};
