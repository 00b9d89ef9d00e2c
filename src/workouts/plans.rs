//! Multi-week training plan catalog.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::library::get_workout;
use super::types::StructuredWorkout;

/// What a plan is built to improve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanGoal {
    BaseFitness,
    FtpBuild,
    EventPrep,
}

impl PlanGoal {
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanGoal::BaseFitness => "Base fitness",
            PlanGoal::FtpBuild => "FTP build",
            PlanGoal::EventPrep => "Event preparation",
        }
    }
}

impl std::fmt::Display for PlanGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A catalog workout placed on a day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledWorkout {
    /// 0 = first day of the training week, 6 = last
    pub day_of_week: u8,
    pub workout_id: String,
}

impl ScheduledWorkout {
    /// Resolve the referenced catalog workout.
    pub fn workout(&self) -> Option<&'static StructuredWorkout> {
        get_workout(&self.workout_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingWeek {
    /// 1-based, sequential within the plan
    pub week_number: u32,
    pub focus: String,
    pub workouts: Vec<ScheduledWorkout>,
}

impl TrainingWeek {
    pub fn workout_on(&self, day_of_week: u8) -> Option<&ScheduledWorkout> {
        self.workouts.iter().find(|w| w.day_of_week == day_of_week)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingPlan {
    pub id: String,
    pub name: String,
    pub description: String,
    pub goal: PlanGoal,
    pub weeks_total: u32,
    pub weeks: Vec<TrainingWeek>,
}

impl TrainingPlan {
    /// Week by 1-based number.
    pub fn week(&self, week_number: u32) -> Option<&TrainingWeek> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    /// Number of scheduled workouts across all weeks.
    pub fn total_workouts(&self) -> usize {
        self.weeks.iter().map(|w| w.workouts.len()).sum()
    }
}

/// Errors from plan lookups and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Training plan not found: {0}")]
    NotFound(String),

    #[error("Invalid plan {plan}: {reason}")]
    Invalid { plan: String, reason: String },

    #[error("Plan {plan} references unknown workout {workout_id}")]
    UnknownWorkout { plan: String, workout_id: String },
}

static PLANS: Lazy<Vec<TrainingPlan>> = Lazy::new(build_plans);

pub fn all_plans() -> &'static [TrainingPlan] {
    &PLANS
}

pub fn get_plan(id: &str) -> Option<&'static TrainingPlan> {
    PLANS.iter().find(|p| p.id == id)
}

pub fn find_plan(id: &str) -> Result<&'static TrainingPlan, PlanError> {
    get_plan(id).ok_or_else(|| PlanError::NotFound(id.to_string()))
}

/// Check week count, week numbering, day range and workout references.
pub fn validate_plan(plan: &TrainingPlan) -> Result<(), PlanError> {
    let invalid = |reason: String| PlanError::Invalid {
        plan: plan.id.clone(),
        reason,
    };

    if plan.weeks.len() != plan.weeks_total as usize {
        return Err(invalid(format!(
            "{} weeks listed but weeks_total is {}",
            plan.weeks.len(),
            plan.weeks_total
        )));
    }

    for (index, week) in plan.weeks.iter().enumerate() {
        let expected = index as u32 + 1;
        if week.week_number != expected {
            return Err(invalid(format!(
                "week {} found where week {} was expected",
                week.week_number, expected
            )));
        }

        for scheduled in &week.workouts {
            if scheduled.day_of_week > 6 {
                return Err(invalid(format!(
                    "week {} schedules day {}",
                    week.week_number, scheduled.day_of_week
                )));
            }
            if scheduled.workout().is_none() {
                return Err(PlanError::UnknownWorkout {
                    plan: plan.id.clone(),
                    workout_id: scheduled.workout_id.clone(),
                });
            }
        }
    }

    Ok(())
}

fn week(week_number: u32, focus: &str, days: &[(u8, &str)]) -> TrainingWeek {
    TrainingWeek {
        week_number,
        focus: focus.to_string(),
        workouts: days
            .iter()
            .map(|&(day_of_week, id)| ScheduledWorkout {
                day_of_week,
                workout_id: id.to_string(),
            })
            .collect(),
    }
}

fn plan(id: &str, name: &str, description: &str, goal: PlanGoal, weeks: Vec<TrainingWeek>) -> TrainingPlan {
    TrainingPlan {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        goal,
        weeks_total: weeks.len() as u32,
        weeks,
    }
}

fn build_plans() -> Vec<TrainingPlan> {
    vec![
        plan(
            "base-builder",
            "Base Builder",
            "Four weeks of aerobic volume with a little tempo",
            PlanGoal::BaseFitness,
            vec![
                week(1, "Aerobic volume", &[(1, "endurance-60"), (3, "recovery-spin"), (5, "endurance-90-cadence")]),
                week(2, "Aerobic volume", &[(1, "endurance-60"), (3, "tempo-3x15"), (5, "endurance-90-cadence")]),
                week(3, "Muscular endurance", &[(1, "tempo-3x15"), (3, "endurance-60"), (5, "sweet-spot-2x20")]),
                week(4, "Recovery", &[(1, "recovery-spin"), (4, "endurance-60")]),
            ],
        ),
        plan(
            "ftp-builder",
            "FTP Builder",
            "Six weeks of sweet spot and threshold work bracketed by FTP tests",
            PlanGoal::FtpBuild,
            vec![
                week(1, "Baseline", &[(1, "ftp-test-20"), (3, "endurance-60"), (5, "sweet-spot-2x20")]),
                week(2, "Sweet spot", &[(1, "sweet-spot-2x20"), (3, "recovery-spin"), (5, "sweet-spot-over-under")]),
                week(3, "Threshold", &[(1, "threshold-3x10"), (3, "endurance-60"), (5, "sweet-spot-over-under")]),
                week(4, "Recovery", &[(1, "recovery-spin"), (3, "endurance-60")]),
                week(5, "Threshold", &[(1, "threshold-3x10"), (3, "vo2max-5x3"), (5, "sweet-spot-2x20")]),
                week(6, "Retest", &[(1, "recovery-spin"), (3, "ftp-test-20")]),
            ],
        ),
        plan(
            "race-sharpener",
            "Race Sharpener",
            "Three weeks of high-intensity work ending in a taper",
            PlanGoal::EventPrep,
            vec![
                week(1, "VO2max", &[(1, "vo2max-5x3"), (3, "endurance-60"), (5, "vo2max-30-30")]),
                week(2, "Anaerobic", &[(1, "sprint-8x15"), (3, "threshold-3x10"), (5, "vo2max-30-30")]),
                week(3, "Taper", &[(1, "recovery-spin"), (3, "sprint-8x15"), (5, "recovery-spin")]),
            ],
        ),
    ]
}
