//! Unit tests for per-ride analytics.

use chrono::{Duration, TimeZone, Utc};
use spinlab::measurements::{Measurement, Measurements};
use spinlab::metrics::analytics::{
    calculate_np, calculate_work, calculate_workout_summary, estimate_ftp, find_records,
    RecordKind, TestProtocol,
};
use spinlab::recording::WorkoutRecord;

fn series(values: &[f64]) -> Vec<Measurement> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Measurement::new(i as i64 * 1000, *v))
        .collect()
}

#[test]
fn test_summary_of_all_channels() {
    let measurements = Measurements {
        power: series(&[100.0, 200.0, 300.0]),
        heartrate: series(&[120.0, 140.0]),
        cadence: Vec::new(),
    };

    let summary = calculate_workout_summary(&measurements);

    assert_eq!(summary.avg_power, Some(200.0));
    assert_eq!(summary.max_power, Some(300.0));
    assert_eq!(summary.avg_heartrate, Some(130.0));
    assert_eq!(summary.max_heartrate, Some(140.0));
    assert_eq!(summary.avg_cadence, None);
    assert_eq!(summary.max_cadence, None);
    assert_eq!(summary.total_data_points, 5);
}

#[test]
fn test_np_constant_power() {
    let samples = vec![250.0; 600];
    assert_eq!(calculate_np(&samples), 250.0);
}

#[test]
fn test_np_short_series_is_mean() {
    assert_eq!(calculate_np(&[]), 0.0);
    assert_eq!(calculate_np(&[100.0, 200.0, 300.0]), 200.0);
    assert_eq!(calculate_np(&vec![180.0; 29]), 180.0);
}

#[test]
fn test_np_above_average_for_intervals() {
    let samples: Vec<f64> = (0..1200)
        .map(|i| if (i / 60) % 2 == 0 { 350.0 } else { 100.0 })
        .collect();

    let np = calculate_np(&samples);
    assert!(np > 225.0, "np = {}", np);
    assert!(np < 350.0, "np = {}", np);
    assert_eq!(np, np.round());
}

#[test]
fn test_work() {
    assert_eq!(calculate_work(&[]), 0);
    assert_eq!(calculate_work(&vec![250.0; 3600]), 900);
    assert_eq!(calculate_work(&[400.0, 699.0]), 1);
}

#[test]
fn test_ftp_estimates() {
    assert_eq!(estimate_ftp(TestProtocol::TwentyMinute, 300.0), 285);
    assert_eq!(estimate_ftp(TestProtocol::FiveMinute, 360.0), 306);
}

#[test]
fn test_records_across_rides() {
    let start = Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap();

    let mut long = WorkoutRecord::new(start);
    long.complete(
        Measurements {
            power: series(&vec![240.0; 60]),
            ..Default::default()
        },
        start + Duration::minutes(25),
    );

    let later = start + Duration::days(2);
    let mut short = WorkoutRecord::new(later);
    short.complete(
        Measurements {
            power: series(&[200.0, 500.0]),
            ..Default::default()
        },
        later + Duration::minutes(10),
    );

    let records = find_records(&[long.clone(), short.clone()]);
    let kinds: Vec<RecordKind> = records.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, RecordKind::ALL.to_vec());

    // Max power from the sprint ride
    assert_eq!(records[0].value, 500.0);
    assert_eq!(records[0].workout_id, short.id);
    // Only the 25-minute ride qualifies for 20-minute power
    assert_eq!(records[1].value, 240.0);
    assert_eq!(records[1].achieved_at, start);
    // NP: 240 constant vs mean 350 of a two-sample ride
    assert_eq!(records[2].value, 350.0);
    assert_eq!(records[2].workout_id, short.id);

    assert!(find_records(&[]).is_empty());
}
