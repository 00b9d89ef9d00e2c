//! Integration tests for ride recording into the database.

use std::time::Duration;

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use spinlab::measurements::{Channel, Measurement, SimulatedSensor};
use spinlab::metrics::analytics::RecordKind;
use spinlab::recording::{export_tcx_to_file, RecordStatus, RideSession};
use spinlab::storage::{Database, PlanProgressTracker};
use spinlab::workouts::{
    ExecutionController, SegmentTarget, StructuredWorkout, WorkoutCategory, WorkoutEvent,
    WorkoutRunner, WorkoutSegment,
};
use spinlab::{AnalyticsEngine, WorkoutRepository};

fn two_block_workout() -> StructuredWorkout {
    StructuredWorkout::new(
        "two-block",
        "Two Block",
        "",
        WorkoutCategory::Endurance,
        2.0,
        0.7,
        vec![
            WorkoutSegment::new("Warmup", 30, SegmentTarget::power(0.5, 0.5)),
            WorkoutSegment::new("Tempo", 30, SegmentTarget::power(0.8, 0.8)),
        ],
    )
}

#[tokio::test(start_paused = true)]
async fn test_simulated_ride_is_saved_and_analyzed() {
    let mut db = Database::open_in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2024, 9, 10, 18, 0, 0).unwrap();
    let start_ms = start.timestamp_millis();

    let mut session = RideSession::start(&mut db, Some("two-block"), start).unwrap();
    assert_eq!(db.get_active().unwrap().map(|r| r.id), Some(session.record().id));

    let mut power = SimulatedSensor::new(Channel::Power);
    let mut heart = SimulatedSensor::new(Channel::Heartrate);
    session.attach(&mut power);
    session.attach(&mut heart);

    let mut controller = ExecutionController::new(two_block_workout(), 200).unwrap();
    controller.subscribe(move |event, snapshot| {
        if matches!(
            event,
            WorkoutEvent::Tick | WorkoutEvent::SegmentChange | WorkoutEvent::Complete
        ) {
            // Sample belongs to the second that just finished
            let second = snapshot.total_elapsed_seconds as i64;
            let watts = if second <= 30 { 100.0 } else { 160.0 };
            power.emit(Measurement::new(start_ms + second * 1000, watts));
            heart.emit(Measurement::new(start_ms + second * 1000, 140.0));
        }
    });

    let mut runner = WorkoutRunner::new(controller, Duration::from_millis(50));
    runner.start();
    runner.wait().await;
    assert!(runner.with_controller(|c| c.is_completed()));
    runner.destroy();

    let record = session
        .finish(&mut db, start + ChronoDuration::seconds(60))
        .unwrap();
    assert_eq!(record.status, RecordStatus::Completed);
    assert_eq!(record.measurements.power.len(), 60);
    assert_eq!(record.measurements.heartrate.len(), 60);

    let stored = db.get_record(&record.id).unwrap().unwrap();
    assert_eq!(stored.measurements, record.measurements);
    let summary = stored.summary.unwrap();
    assert_eq!(summary.avg_power, Some(130.0));
    assert_eq!(summary.max_power, Some(160.0));
    assert!(db.get_active().unwrap().is_none());

    let engine = AnalyticsEngine::new(&db, 200);
    assert_eq!(engine.history().unwrap().len(), 1);

    let zones = engine.aggregated_power_zones().unwrap();
    // 100 W = 50% FTP, 160 W = 80% FTP; the first sample only opens the series
    assert_eq!(zones.zone(1).unwrap().duration_ms, 29_000);
    assert_eq!(zones.zone(3).unwrap().duration_ms, 30_000);
    assert_eq!(zones.total_ms, 59_000);

    let records = engine.find_records().unwrap();
    let max = records.iter().find(|r| r.kind == RecordKind::MaxPower).unwrap();
    assert_eq!(max.value, 160.0);
    assert_eq!(max.workout_id, record.id);
    assert!(records.iter().all(|r| r.kind != RecordKind::TwentyMinutePower));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ride.tcx");
    export_tcx_to_file(&db.get_record(&record.id).unwrap().unwrap(), &path).unwrap();
    let xml = std::fs::read_to_string(&path).unwrap();
    assert_eq!(xml.matches("<Trackpoint>").count(), 60);
    assert!(xml.contains("<ns3:MaxWatts>160</ns3:MaxWatts>"));
}

#[test]
fn test_discarded_ride_stays_out_of_history() {
    let mut db = Database::open_in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2024, 9, 11, 7, 0, 0).unwrap();

    let session = RideSession::start(&mut db, None, start).unwrap();
    session
        .sender()
        .send(Channel::Power, Measurement::new(start.timestamp_millis(), 210.0));
    let record = session.discard(&mut db, start + ChronoDuration::minutes(2)).unwrap();

    let stored = db.get_record(&record.id).unwrap().unwrap();
    assert_eq!(stored.status, RecordStatus::Discarded);
    assert_eq!(stored.measurements.power.len(), 1);
    assert!(db.get_history(None).unwrap().is_empty());
    assert!(AnalyticsEngine::new(&db, 200).find_records().unwrap().is_empty());
}

#[test]
fn test_ride_completes_plan_workout() {
    let mut db = Database::open_in_memory().unwrap();
    let start = Utc.with_ymd_and_hms(2024, 9, 9, 6, 0, 0).unwrap();

    PlanProgressTracker::new(&mut db).start_plan("base-builder", start).unwrap();

    let session = RideSession::start(&mut db, Some("endurance-60"), start).unwrap();
    let record = session.finish(&mut db, start + ChronoDuration::hours(1)).unwrap();

    let progress = PlanProgressTracker::new(&mut db)
        .mark_completed("base-builder", 1, 1, Some(record.id), record.end_time.unwrap())
        .unwrap();
    assert_eq!(progress.completed[0].workout_result_id, Some(record.id));

    let tracker = PlanProgressTracker::new(&mut db);
    let (week, next) = tracker.next_workout("base-builder").unwrap().unwrap();
    assert_eq!((week, next.day_of_week), (1, 3));
}
