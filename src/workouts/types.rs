//! Structured workout types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::zones::PowerRange;

/// Target for one segment. Power is expressed as fractions of FTP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentTarget {
    /// Lower bound, e.g. 0.85 = 85% FTP
    pub power_low: f64,
    /// Upper bound, never below `power_low`
    pub power_high: f64,
    pub cadence_low: Option<u16>,
    pub cadence_high: Option<u16>,
}

impl SegmentTarget {
    /// Power-only target between two FTP fractions.
    pub const fn power(power_low: f64, power_high: f64) -> Self {
        Self {
            power_low,
            power_high,
            cadence_low: None,
            cadence_high: None,
        }
    }

    /// Add a cadence range in RPM.
    pub const fn with_cadence(mut self, low: u16, high: u16) -> Self {
        self.cadence_low = Some(low);
        self.cadence_high = Some(high);
        self
    }

    /// Absolute watts for the given FTP.
    pub fn power_range(&self, ftp: u16) -> PowerRange {
        PowerRange::from_fractions(self.power_low, self.power_high, ftp)
    }
}

/// One timed interval of a structured workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSegment {
    pub name: String,
    /// Always greater than zero
    pub duration_seconds: u32,
    pub target: SegmentTarget,
    /// Coaching text shown during the segment
    pub instructions: Option<String>,
}

impl WorkoutSegment {
    pub fn new(name: impl Into<String>, duration_seconds: u32, target: SegmentTarget) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
            target,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Workout category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkoutCategory {
    Recovery,
    Endurance,
    Tempo,
    SweetSpot,
    Threshold,
    Vo2max,
    Sprint,
}

impl WorkoutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutCategory::Recovery => "Recovery",
            WorkoutCategory::Endurance => "Endurance",
            WorkoutCategory::Tempo => "Tempo",
            WorkoutCategory::SweetSpot => "Sweet Spot",
            WorkoutCategory::Threshold => "Threshold",
            WorkoutCategory::Vo2max => "VO2max",
            WorkoutCategory::Sprint => "Sprint",
        }
    }

    pub fn all() -> [WorkoutCategory; 7] {
        [
            WorkoutCategory::Recovery,
            WorkoutCategory::Endurance,
            WorkoutCategory::Tempo,
            WorkoutCategory::SweetSpot,
            WorkoutCategory::Threshold,
            WorkoutCategory::Vo2max,
            WorkoutCategory::Sprint,
        ]
    }
}

impl std::fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl std::str::FromStr for WorkoutCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase().replace(['_', ' '], "-");
        WorkoutCategory::all()
            .into_iter()
            .find(|c| c.display_name().to_ascii_lowercase().replace(' ', "-") == key)
            .ok_or_else(|| format!("unknown workout category '{}'", s))
    }
}

/// A structured training workout from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredWorkout {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: WorkoutCategory,
    /// Sum of all segment durations
    pub total_duration_seconds: u32,
    /// Estimated training load, carried as metadata
    pub training_stress_score: f64,
    /// Estimated average relative intensity, carried as metadata
    pub intensity_factor: f64,
    pub segments: Vec<WorkoutSegment>,
}

impl StructuredWorkout {
    /// Create a workout; the total duration is derived from the segments.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: WorkoutCategory,
        training_stress_score: f64,
        intensity_factor: f64,
        segments: Vec<WorkoutSegment>,
    ) -> Self {
        let total_duration_seconds = segments.iter().map(|s| s.duration_seconds).sum();

        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            total_duration_seconds,
            training_stress_score,
            intensity_factor,
            segments,
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.total_duration_seconds / 60
    }

    /// Check the structural invariants of the workout.
    pub fn validate(&self) -> Result<(), WorkoutError> {
        if self.segments.is_empty() {
            return Err(WorkoutError::InvalidWorkout(format!(
                "{} has no segments",
                self.id
            )));
        }

        for segment in &self.segments {
            if segment.duration_seconds == 0 {
                return Err(WorkoutError::InvalidWorkout(format!(
                    "{}: segment '{}' has zero duration",
                    self.id, segment.name
                )));
            }
            if segment.target.power_low > segment.target.power_high {
                return Err(WorkoutError::InvalidWorkout(format!(
                    "{}: segment '{}' has power_low above power_high",
                    self.id, segment.name
                )));
            }
        }

        let sum: u32 = self.segments.iter().map(|s| s.duration_seconds).sum();
        if sum != self.total_duration_seconds {
            return Err(WorkoutError::InvalidWorkout(format!(
                "{}: segments sum to {}s but total is {}s",
                self.id, sum, self.total_duration_seconds
            )));
        }

        Ok(())
    }
}

/// Errors related to workout operations.
#[derive(Debug, Error, PartialEq)]
pub enum WorkoutError {
    /// Workout not found
    #[error("Workout not found: {0}")]
    NotFound(String),

    /// Invalid workout structure
    #[error("Invalid workout: {0}")]
    InvalidWorkout(String),
}
