//! Analytics over the stored workout history.

use chrono::{DateTime, Local, TimeZone, Weekday};

use super::error::AnalyticsResult;
use super::power::{self, ZoneCounts};
use super::records::{self, PersonalRecord};
use super::summary::{self, WorkoutSummary};
use super::trends::{self, Period, TrendPoint};
use crate::measurements::Measurements;
use crate::metrics::distribution::{measurement_distribution, ZoneDistribution};
use crate::metrics::zones::{ZoneBand, HEART_RATE_ZONE_TABLE, POWER_ZONE_TABLE};
use crate::recording::{WorkoutRecord, WorkoutRepository};

/// Computes summaries, trends and records from a workout repository.
///
/// The only state is the FTP baseline used for zone classification.
pub struct AnalyticsEngine<'a, R: WorkoutRepository + ?Sized> {
    repository: &'a R,
    ftp: u16,
    week_start: Weekday,
}

impl<'a, R: WorkoutRepository + ?Sized> AnalyticsEngine<'a, R> {
    pub fn new(repository: &'a R, ftp: u16) -> Self {
        Self {
            repository,
            ftp,
            week_start: Weekday::Mon,
        }
    }

    /// Use a different first day of the week for weekly trends.
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn set_ftp(&mut self, ftp: u16) {
        tracing::debug!("Analytics FTP set to {}", ftp);
        self.ftp = ftp;
    }

    pub fn ftp(&self) -> u16 {
        self.ftp
    }

    pub fn calculate_workout_summary(&self, measurements: &Measurements) -> WorkoutSummary {
        summary::calculate_workout_summary(measurements)
    }

    pub fn calculate_np(&self, samples: &[f64]) -> f64 {
        power::calculate_np(samples)
    }

    pub fn calculate_work(&self, samples: &[f64]) -> u32 {
        power::calculate_work(samples)
    }

    /// Sample counts per analytics zone at the current FTP.
    pub fn calculate_zones(&self, samples: &[f64]) -> ZoneCounts {
        power::calculate_zones(samples, self.ftp)
    }

    /// All completed workouts, newest first.
    pub fn history(&self) -> AnalyticsResult<Vec<WorkoutRecord>> {
        Ok(self.repository.get_history(None)?)
    }

    /// `count` trend points ending with the period that contains now.
    pub fn calculate_trends(&self, period: Period, count: usize) -> AnalyticsResult<Vec<TrendPoint>> {
        self.calculate_trends_at(period, count, &Local::now())
    }

    pub fn calculate_trends_at<Tz: TimeZone>(
        &self,
        period: Period,
        count: usize,
        now: &DateTime<Tz>,
    ) -> AnalyticsResult<Vec<TrendPoint>> {
        let history = self.history()?;
        Ok(trends::calculate_trends(
            &history,
            period,
            count,
            now,
            self.week_start,
        ))
    }

    pub fn find_records(&self) -> AnalyticsResult<Vec<PersonalRecord>> {
        let history = self.history()?;
        Ok(records::find_records(&history))
    }

    /// Time in each of the seven power zones across all history.
    pub fn aggregated_power_zones(&self) -> AnalyticsResult<ZoneDistribution> {
        let reference = self.ftp as f64;
        self.aggregate(&POWER_ZONE_TABLE, |record| {
            measurement_distribution(&record.measurements.power, reference, &POWER_ZONE_TABLE)
        })
    }

    /// Time in each heart rate zone across all history.
    pub fn aggregated_heartrate_zones(&self, max_hr: u16) -> AnalyticsResult<ZoneDistribution> {
        let reference = max_hr as f64;
        self.aggregate(&HEART_RATE_ZONE_TABLE, |record| {
            measurement_distribution(
                &record.measurements.heartrate,
                reference,
                &HEART_RATE_ZONE_TABLE,
            )
        })
    }

    fn aggregate<F>(&self, bands: &[ZoneBand], per_record: F) -> AnalyticsResult<ZoneDistribution>
    where
        F: Fn(&WorkoutRecord) -> ZoneDistribution,
    {
        let mut total = ZoneDistribution::empty(bands);
        for record in self.history()? {
            total.merge(&per_record(&record));
        }
        Ok(total)
    }
}
