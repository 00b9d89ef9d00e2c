//! Rider settings and training plan progress over a key-value store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::storage::database::DatabaseError;
use crate::workouts::plans::{find_plan, PlanError, ScheduledWorkout, TrainingPlan};

/// Lowest accepted FTP in watts.
pub const MIN_FTP: u16 = 50;
/// Highest accepted FTP in watts.
pub const MAX_FTP: u16 = 600;

const FTP_KEY: &str = "ftp";
const MAX_HR_KEY: &str = "max-hr";
const ZONE_PREFERENCES_KEY: &str = "zone-preferences";
const PLAN_PROGRESS_PREFIX: &str = "plan-progress:";

/// Errors from settings and progress operations.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("FTP must be between {MIN_FTP} and {MAX_FTP} watts, got {0}")]
    InvalidFtp(u16),

    #[error("Max heart rate must be positive")]
    InvalidMaxHr,

    #[error("Plan {0} has not been started")]
    PlanNotStarted(String),

    #[error("Plan {plan} has no workout on week {week_number}, day {day_of_week}")]
    NotScheduled {
        plan: String,
        week_number: u32,
        day_of_week: u8,
    },

    #[error("Corrupt value for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Settings store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Raw string key-value persistence.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SettingsError>;
}

/// Settings kept in memory.
#[derive(Debug, Default, Clone)]
pub struct InMemorySettings {
    values: HashMap<String, String>,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for InMemorySettings {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        self.values.remove(key);
        Ok(())
    }
}

fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>, SettingsError>
where
    S: SettingsStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SettingsError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}

fn write_json<S, T>(store: &mut S, key: &str, value: &T) -> Result<(), SettingsError>
where
    S: SettingsStore + ?Sized,
    T: Serialize,
{
    let raw = serde_json::to_string(value).map_err(|e| SettingsError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &raw)
}

/// Which power zone model to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerZoneView {
    /// Seven zones up to Neuromuscular
    #[default]
    SevenZone,
    /// Six zones, Neuromuscular folded into Anaerobic
    SixZone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePreferences {
    pub power_view: PowerZoneView,
    pub show_heart_rate_zones: bool,
}

impl Default for ZonePreferences {
    fn default() -> Self {
        Self {
            power_view: PowerZoneView::SevenZone,
            show_heart_rate_zones: true,
        }
    }
}

/// Typed rider settings with fallbacks for unset values.
pub struct UserSettings<'a, S: SettingsStore + ?Sized> {
    store: &'a mut S,
    default_ftp: u16,
    default_max_hr: u16,
}

impl<'a, S: SettingsStore + ?Sized> UserSettings<'a, S> {
    pub fn new(store: &'a mut S, default_ftp: u16, default_max_hr: u16) -> Self {
        Self {
            store,
            default_ftp,
            default_max_hr,
        }
    }

    /// Validate FTP value (50-600 watts).
    pub fn validate_ftp(ftp: u16) -> bool {
        (MIN_FTP..=MAX_FTP).contains(&ftp)
    }

    pub fn ftp(&self) -> Result<u16, SettingsError> {
        Ok(read_json(&*self.store, FTP_KEY)?.unwrap_or(self.default_ftp))
    }

    pub fn set_ftp(&mut self, ftp: u16) -> Result<(), SettingsError> {
        if !Self::validate_ftp(ftp) {
            return Err(SettingsError::InvalidFtp(ftp));
        }
        write_json(&mut *self.store, FTP_KEY, &ftp)?;
        tracing::info!("FTP set to {} W", ftp);
        Ok(())
    }

    pub fn max_hr(&self) -> Result<u16, SettingsError> {
        Ok(read_json(&*self.store, MAX_HR_KEY)?.unwrap_or(self.default_max_hr))
    }

    pub fn set_max_hr(&mut self, max_hr: u16) -> Result<(), SettingsError> {
        if max_hr == 0 {
            return Err(SettingsError::InvalidMaxHr);
        }
        write_json(&mut *self.store, MAX_HR_KEY, &max_hr)
    }

    pub fn zone_preferences(&self) -> Result<ZonePreferences, SettingsError> {
        Ok(read_json(&*self.store, ZONE_PREFERENCES_KEY)?.unwrap_or_default())
    }

    pub fn set_zone_preferences(&mut self, prefs: &ZonePreferences) -> Result<(), SettingsError> {
        write_json(&mut *self.store, ZONE_PREFERENCES_KEY, prefs)
    }
}

/// One finished scheduled workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedWorkout {
    pub week_number: u32,
    pub day_of_week: u8,
    pub completed_at: DateTime<Utc>,
    /// Record produced by the ride, if one was saved
    pub workout_result_id: Option<Uuid>,
}

/// Stored progress through one training plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanProgress {
    pub plan_id: String,
    pub started_at: DateTime<Utc>,
    /// 1-based week the rider is working on
    pub current_week: u32,
    pub completed: Vec<CompletedWorkout>,
}

impl PlanProgress {
    pub fn is_completed(&self, week_number: u32, day_of_week: u8) -> bool {
        self.completed
            .iter()
            .any(|c| c.week_number == week_number && c.day_of_week == day_of_week)
    }

    fn week_done(&self, plan: &TrainingPlan, week_number: u32) -> bool {
        plan.week(week_number).is_some_and(|week| {
            week.workouts
                .iter()
                .all(|w| self.is_completed(week_number, w.day_of_week))
        })
    }
}

/// Tracks per-plan progress under `plan-progress:<plan id>` keys.
pub struct PlanProgressTracker<'a, S: SettingsStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: SettingsStore + ?Sized> PlanProgressTracker<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    fn key(plan_id: &str) -> String {
        format!("{}{}", PLAN_PROGRESS_PREFIX, plan_id)
    }

    /// Begin (or restart) a plan at week 1.
    pub fn start_plan(&mut self, plan_id: &str, now: DateTime<Utc>) -> Result<PlanProgress, SettingsError> {
        find_plan(plan_id)?;

        let progress = PlanProgress {
            plan_id: plan_id.to_string(),
            started_at: now,
            current_week: 1,
            completed: Vec::new(),
        };
        write_json(&mut *self.store, &Self::key(plan_id), &progress)?;
        tracing::info!("Started training plan {}", plan_id);
        Ok(progress)
    }

    pub fn get_progress(&self, plan_id: &str) -> Result<Option<PlanProgress>, SettingsError> {
        read_json(&*self.store, &Self::key(plan_id))
    }

    fn require_progress(&self, plan_id: &str) -> Result<PlanProgress, SettingsError> {
        self.get_progress(plan_id)?
            .ok_or_else(|| SettingsError::PlanNotStarted(plan_id.to_string()))
    }

    /// Record a scheduled workout as done.
    ///
    /// Marking the same week/day twice keeps the first entry. Once every
    /// workout of the current week is done, `current_week` moves on (it
    /// never passes the last week).
    pub fn mark_completed(
        &mut self,
        plan_id: &str,
        week_number: u32,
        day_of_week: u8,
        workout_result_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<PlanProgress, SettingsError> {
        let plan = find_plan(plan_id)?;
        let mut progress = self.require_progress(plan_id)?;

        let scheduled = plan
            .week(week_number)
            .and_then(|w| w.workout_on(day_of_week))
            .is_some();
        if !scheduled {
            return Err(SettingsError::NotScheduled {
                plan: plan_id.to_string(),
                week_number,
                day_of_week,
            });
        }

        if progress.is_completed(week_number, day_of_week) {
            return Ok(progress);
        }

        progress.completed.push(CompletedWorkout {
            week_number,
            day_of_week,
            completed_at: now,
            workout_result_id,
        });
        while progress.current_week < plan.weeks_total
            && progress.week_done(plan, progress.current_week)
        {
            progress.current_week += 1;
        }

        write_json(&mut *self.store, &Self::key(plan_id), &progress)?;
        tracing::debug!(
            "Plan {} week {} day {} completed",
            plan_id,
            week_number,
            day_of_week
        );
        Ok(progress)
    }

    pub fn is_completed(&self, plan_id: &str, week_number: u32, day_of_week: u8) -> Result<bool, SettingsError> {
        Ok(self
            .get_progress(plan_id)?
            .is_some_and(|p| p.is_completed(week_number, day_of_week)))
    }

    /// Share of scheduled workouts done, 0-100. Zero for a plan not started.
    pub fn completion_percent(&self, plan_id: &str) -> Result<f64, SettingsError> {
        let plan = find_plan(plan_id)?;
        let total = plan.total_workouts();
        let Some(progress) = self.get_progress(plan_id)? else {
            return Ok(0.0);
        };
        if total == 0 {
            return Ok(0.0);
        }
        Ok(progress.completed.len() as f64 * 100.0 / total as f64)
    }

    /// First scheduled workout not yet done, in calendar order.
    pub fn next_workout(&self, plan_id: &str) -> Result<Option<(u32, ScheduledWorkout)>, SettingsError> {
        let plan = find_plan(plan_id)?;
        let progress = self.require_progress(plan_id)?;

        for week in &plan.weeks {
            let mut days: Vec<&ScheduledWorkout> = week.workouts.iter().collect();
            days.sort_by_key(|w| w.day_of_week);
            if let Some(next) = days
                .into_iter()
                .find(|w| !progress.is_completed(week.week_number, w.day_of_week))
            {
                return Ok(Some((week.week_number, next.clone())));
            }
        }
        Ok(None)
    }

    /// Forget all progress on a plan.
    pub fn reset_plan(&mut self, plan_id: &str) -> Result<(), SettingsError> {
        self.store.remove(&Self::key(plan_id))?;
        tracing::info!("Reset training plan {}", plan_id);
        Ok(())
    }
}
