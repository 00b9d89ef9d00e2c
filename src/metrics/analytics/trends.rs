//! Training trends over calendar-aligned periods.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::power::{average, calculate_work};
use crate::recording::WorkoutRecord;

/// Trend bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!("unknown period '{}'", other)),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        };
        f.write_str(name)
    }
}

/// Half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl PeriodWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Aggregates for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub workout_count: usize,
    pub total_duration_seconds: i64,
    /// Mean of per-workout average power, rounded
    pub avg_power: Option<f64>,
    /// Mean of per-workout average heart rate, rounded
    pub avg_heartrate: Option<f64>,
    pub total_work_kj: u32,
}

/// `count` consecutive windows, oldest first. The last one contains `now`.
///
/// Day and week windows run from local midnight, weeks begin on
/// `week_start`, months are calendar months.
pub fn period_windows<Tz: TimeZone>(
    period: Period,
    count: usize,
    now: &DateTime<Tz>,
    week_start: Weekday,
) -> Vec<PeriodWindow> {
    let tz = now.timezone();
    let today = now.date_naive();

    let current_start = match period {
        Period::Day => today,
        Period::Week => {
            let back = (today.weekday().num_days_from_monday() + 7
                - week_start.num_days_from_monday())
                % 7;
            today - Duration::days(back as i64)
        }
        Period::Month => today.with_day(1).unwrap_or(today),
    };

    (0..count)
        .rev()
        .filter_map(|offset| {
            let offset = offset as u32;
            let (start, end) = match period {
                Period::Day => {
                    let start = current_start - Duration::days(offset as i64);
                    (start, start + Duration::days(1))
                }
                Period::Week => {
                    let start = current_start - Duration::weeks(offset as i64);
                    (start, start + Duration::weeks(1))
                }
                Period::Month => {
                    let start = current_start.checked_sub_months(Months::new(offset))?;
                    (start, start.checked_add_months(Months::new(1))?)
                }
            };
            Some(PeriodWindow {
                start: local_midnight(&tz, start),
                end: local_midnight(&tz, end),
            })
        })
        .collect()
}

/// Bucket completed records into trend points over `period_windows`.
pub fn calculate_trends<Tz: TimeZone>(
    records: &[WorkoutRecord],
    period: Period,
    count: usize,
    now: &DateTime<Tz>,
    week_start: Weekday,
) -> Vec<TrendPoint> {
    period_windows(period, count, now, week_start)
        .into_iter()
        .map(|window| {
            let in_window: Vec<&WorkoutRecord> = records
                .iter()
                .filter(|r| r.is_completed() && window.contains(r.start_time))
                .collect();
            trend_point(window, &in_window)
        })
        .collect()
}

fn trend_point(window: PeriodWindow, records: &[&WorkoutRecord]) -> TrendPoint {
    let mut powers = Vec::new();
    let mut heartrates = Vec::new();
    let mut total_work_kj = 0;
    let mut total_duration_seconds = 0;

    for record in records {
        let summary = record.summary_or_compute();
        powers.extend(summary.avg_power);
        heartrates.extend(summary.avg_heartrate);
        total_work_kj += calculate_work(&record.measurements.power_values());
        total_duration_seconds += record.duration_seconds();
    }

    TrendPoint {
        start: window.start,
        end: window.end,
        workout_count: records.len(),
        total_duration_seconds,
        avg_power: average(&powers).map(f64::round),
        avg_heartrate: average(&heartrates).map(f64::round),
        total_work_kj,
    }
}

/// Start of `date` in `tz`, as UTC.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // DST gap at midnight: the local day starts an hour later
        .or_else(|| {
            tz.from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
