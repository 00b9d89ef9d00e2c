//! Integration tests for analytics over a stored history.

use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use spinlab::measurements::{Measurement, Measurements};
use spinlab::metrics::analytics::{Period, RecordKind};
use spinlab::recording::{InMemoryRepository, WorkoutRecord};
use spinlab::storage::Database;
use spinlab::{AnalyticsEngine, WorkoutRepository};

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// A completed ride of `minutes` with constant power and heart rate at 1 Hz.
fn ride(start: DateTime<Utc>, minutes: i64, watts: f64, bpm: f64) -> WorkoutRecord {
    let seconds = minutes * 60;
    let base = start.timestamp_millis();
    let series = |value: f64| -> Vec<Measurement> {
        (0..seconds)
            .map(|i| Measurement::new(base + i * 1000, value))
            .collect()
    };

    let mut record = WorkoutRecord::new(start);
    record.complete(
        Measurements {
            power: series(watts),
            heartrate: series(bpm),
            cadence: Vec::new(),
        },
        start + Duration::minutes(minutes),
    );
    record
}

#[test]
fn test_empty_history_everywhere() {
    let db = Database::open_in_memory().unwrap();
    let engine = AnalyticsEngine::new(&db, 250);

    let trends = engine.calculate_trends(Period::Week, 4).unwrap();
    assert_eq!(trends.len(), 4);
    assert!(trends.iter().all(|t| t.workout_count == 0 && t.total_work_kj == 0));
    assert!(trends.windows(2).all(|w| w[0].end == w[1].start));

    assert!(engine.find_records().unwrap().is_empty());
    assert_eq!(engine.aggregated_power_zones().unwrap().total_ms, 0);
    assert_eq!(engine.aggregated_heartrate_zones(190).unwrap().total_ms, 0);
}

#[test]
fn test_weekly_trends_from_database() {
    let mut db = Database::open_in_memory().unwrap();
    // Weeks starting Monday 2024-05-13 and 2024-05-20
    db.save(&ride(at(2024, 5, 14, 18), 30, 200.0, 140.0)).unwrap();
    db.save(&ride(at(2024, 5, 21, 18), 20, 180.0, 130.0)).unwrap();
    db.save(&ride(at(2024, 5, 23, 18), 40, 220.0, 150.0)).unwrap();
    db.save(&WorkoutRecord::new(at(2024, 5, 24, 18))).unwrap();

    let engine = AnalyticsEngine::new(&db, 250).with_week_start(Weekday::Mon);
    let trends = engine
        .calculate_trends_at(Period::Week, 2, &at(2024, 5, 25, 12))
        .unwrap();

    assert_eq!(trends[0].start, at(2024, 5, 13, 0));
    assert_eq!(trends[0].workout_count, 1);
    assert_eq!(trends[0].total_duration_seconds, 30 * 60);
    assert_eq!(trends[0].avg_power, Some(200.0));
    assert_eq!(trends[0].total_work_kj, 360);

    assert_eq!(trends[1].start, at(2024, 5, 20, 0));
    assert_eq!(trends[1].workout_count, 2);
    assert_eq!(trends[1].total_duration_seconds, 60 * 60);
    assert_eq!(trends[1].avg_power, Some(200.0));
    assert_eq!(trends[1].avg_heartrate, Some(140.0));
    assert_eq!(trends[1].total_work_kj, 216 + 528);
}

#[test]
fn test_records_and_zones_from_repository() {
    let mut repo = InMemoryRepository::new();
    let endurance = ride(at(2024, 5, 1, 7), 25, 150.0, 120.0);
    let threshold = ride(at(2024, 5, 3, 7), 10, 260.0, 170.0);
    repo.save(&endurance).unwrap();
    repo.save(&threshold).unwrap();

    let engine = AnalyticsEngine::new(&repo, 250);
    let records = engine.find_records().unwrap();

    let by_kind = |kind: RecordKind| records.iter().find(|r| r.kind == kind).unwrap();
    assert_eq!(by_kind(RecordKind::MaxPower).workout_id, threshold.id);
    assert_eq!(by_kind(RecordKind::TwentyMinutePower).workout_id, endurance.id);
    assert_eq!(by_kind(RecordKind::TwentyMinutePower).value, 150.0);
    assert_eq!(by_kind(RecordKind::NormalizedPower).value, 260.0);

    // 150 W = 60% of 250 -> Endurance, 260 W = 104% -> Threshold
    let zones = engine.aggregated_power_zones().unwrap();
    let endurance_ms = (25 * 60 - 1) * 1000;
    let threshold_ms = (10 * 60 - 1) * 1000;
    assert_eq!(zones.zone(2).unwrap().duration_ms, endurance_ms);
    assert_eq!(zones.zone(4).unwrap().duration_ms, threshold_ms);
    assert_eq!(zones.total_ms, endurance_ms + threshold_ms);
    let percent_sum: f64 = zones.zones.iter().map(|z| z.percent).sum();
    assert!((percent_sum - 100.0).abs() < 1e-9);
}
