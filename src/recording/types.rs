//! Persisted workout records and export errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::measurements::Measurements;
use crate::metrics::analytics::{calculate_workout_summary, WorkoutSummary};

/// Lifecycle of a stored workout record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Being recorded
    #[default]
    Active,
    /// Finished and kept
    Completed,
    /// Abandoned by the rider
    Discarded,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "active",
            RecordStatus::Completed => "completed",
            RecordStatus::Discarded => "discarded",
        }
    }
}

impl std::str::FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RecordStatus::Active),
            "completed" => Ok(RecordStatus::Completed),
            "discarded" => Ok(RecordStatus::Discarded),
            other => Err(format!("unknown record status '{}'", other)),
        }
    }
}

/// One recorded workout session with its raw measurement series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub status: RecordStatus,
    /// Catalog workout that was ridden, if any
    pub workout_id: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub measurements: Measurements,
    pub summary: Option<WorkoutSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkoutRecord {
    /// Create a new active record starting at `start_time`.
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: RecordStatus::Active,
            workout_id: None,
            start_time,
            end_time: None,
            measurements: Measurements::default(),
            summary: None,
            created_at: start_time,
            updated_at: start_time,
        }
    }

    /// Attach the catalog workout being ridden.
    pub fn with_workout(mut self, workout_id: impl Into<String>) -> Self {
        self.workout_id = Some(workout_id.into());
        self
    }

    /// Seconds between start and end; 0 while the record is still open.
    pub fn duration_seconds(&self) -> i64 {
        self.end_time
            .map(|end| (end - self.start_time).num_seconds().max(0))
            .unwrap_or(0)
    }

    pub fn is_completed(&self) -> bool {
        self.status == RecordStatus::Completed
    }

    /// Close the record as completed and compute its summary.
    pub fn complete(&mut self, measurements: Measurements, end_time: DateTime<Utc>) {
        self.summary = Some(calculate_workout_summary(&measurements));
        self.measurements = measurements;
        self.end_time = Some(end_time);
        self.status = RecordStatus::Completed;
        self.updated_at = end_time;
    }

    /// Close the record as discarded. Measurements are kept as-is.
    pub fn discard(&mut self, end_time: DateTime<Utc>) {
        self.end_time = Some(end_time);
        self.status = RecordStatus::Discarded;
        self.updated_at = end_time;
    }

    /// Stored summary, or one computed from the measurements.
    pub fn summary_or_compute(&self) -> WorkoutSummary {
        self.summary
            .clone()
            .unwrap_or_else(|| calculate_workout_summary(&self.measurements))
    }
}

/// Errors that can occur during export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("XML error: {0}")]
    XmlError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
