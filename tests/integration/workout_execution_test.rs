//! Integration tests for timed workout execution.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use spinlab::workouts::{
    find_workout, ExecutionController, SegmentTarget, StructuredWorkout, WorkoutCategory,
    WorkoutEvent, WorkoutRunner, WorkoutSegment,
};

fn short_workout() -> StructuredWorkout {
    StructuredWorkout::new(
        "short",
        "Short",
        "Two blocks",
        WorkoutCategory::Tempo,
        5.0,
        0.8,
        vec![
            WorkoutSegment::new("Easy", 3, SegmentTarget::power(0.5, 0.6)),
            WorkoutSegment::new("Hard", 7, SegmentTarget::power(0.9, 1.0)),
        ],
    )
}

#[tokio::test(start_paused = true)]
async fn test_runner_drives_full_workout() {
    let controller = ExecutionController::new(short_workout(), 250).unwrap();
    let mut runner = WorkoutRunner::new(controller, Duration::from_millis(10));

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    runner.with_controller(|c| {
        c.subscribe(move |event, snapshot| {
            sink.lock()
                .unwrap()
                .push((event, snapshot.segment_index, snapshot.total_elapsed_seconds));
        });
    });

    runner.start();
    runner.wait().await;

    let events = events.lock().unwrap();
    assert_eq!(events.first().map(|e| e.0), Some(WorkoutEvent::Start));
    assert_eq!(events.last(), Some(&(WorkoutEvent::Complete, 1, 10)));

    let change = events
        .iter()
        .find(|e| e.0 == WorkoutEvent::SegmentChange)
        .copied();
    assert_eq!(change, Some((WorkoutEvent::SegmentChange, 1, 3)));

    // Countdown for the last 5 seconds of each segment (2 + 5)
    let countdowns = events.iter().filter(|e| e.0 == WorkoutEvent::Countdown).count();
    assert_eq!(countdowns, 7);
    assert!(!runner.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn test_ftp_change_applies_mid_workout() {
    let workout = find_workout("threshold-3x10").unwrap().clone();
    let controller = ExecutionController::new(workout, 200).unwrap();
    let mut runner = WorkoutRunner::with_default_period(controller);

    runner.start();
    tokio::time::sleep(Duration::from_millis(12 * 60 * 1000 + 500)).await;

    let (index, range) = runner.with_controller(|c| (c.segment_index(), c.target_power_range()));
    assert_eq!(index, 1);
    assert_eq!((range.low, range.high), (190, 210));

    runner.with_controller(|c| c.set_ftp(300));
    let range = runner.with_controller(|c| c.target_power_range());
    assert_eq!((range.low, range.high), (285, 315));

    runner.pause();
    let elapsed = runner.with_controller(|c| c.total_elapsed_seconds());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(runner.with_controller(|c| c.total_elapsed_seconds()), elapsed);
    runner.destroy();
}

#[tokio::test(start_paused = true)]
async fn test_shared_controller_handle() {
    let controller = ExecutionController::new(short_workout(), 200).unwrap();
    let mut runner = WorkoutRunner::new(controller, Duration::from_millis(100));
    let handle = runner.controller();

    runner.start();
    tokio::time::sleep(Duration::from_millis(550)).await;

    let elapsed = handle.lock().unwrap().total_elapsed_seconds();
    assert_eq!(elapsed, 5);
    assert_eq!(handle.lock().unwrap().segment_index(), 1);

    runner.reset();
    assert_eq!(handle.lock().unwrap().total_elapsed_seconds(), 0);
}
