//! Unit tests for the workout execution state machine.

use std::sync::{Arc, Mutex};

use spinlab::metrics::{PowerRange, ZoneStatus};
use spinlab::workouts::{
    ExecutionController, ExecutionStatus, SegmentTarget, StructuredWorkout, WorkoutCategory,
    WorkoutError, WorkoutEvent, WorkoutSegment,
};

fn workout(segments: &[(u32, f64, f64)]) -> StructuredWorkout {
    let segments = segments
        .iter()
        .enumerate()
        .map(|(i, &(duration, low, high))| {
            WorkoutSegment::new(format!("Segment {}", i + 1), duration, SegmentTarget::power(low, high))
        })
        .collect();
    StructuredWorkout::new(
        "test",
        "Test Workout",
        "",
        WorkoutCategory::Endurance,
        0.0,
        0.0,
        segments,
    )
}

fn recorder(controller: &mut ExecutionController) -> Arc<Mutex<Vec<WorkoutEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    controller.subscribe(move |event, _| sink.lock().unwrap().push(event));
    events
}

#[test]
fn test_segments_advance_then_complete() {
    let mut controller = ExecutionController::new(workout(&[(2, 0.5, 0.6), (3, 0.9, 1.0)]), 200).unwrap();
    let events = recorder(&mut controller);

    controller.start();
    controller.tick();
    controller.tick();
    assert_eq!(controller.segment_index(), 1);
    assert_eq!(controller.segment_elapsed_seconds(), 0);
    assert_eq!(controller.total_elapsed_seconds(), 2);
    assert!(events.lock().unwrap().contains(&WorkoutEvent::SegmentChange));

    for _ in 0..3 {
        controller.tick();
    }
    assert_eq!(controller.status(), ExecutionStatus::Completed);
    assert!(!controller.is_running());
    assert_eq!(controller.total_elapsed_seconds(), 5);
    assert_eq!(controller.progress(), 1.0);
    assert_eq!(events.lock().unwrap().last(), Some(&WorkoutEvent::Complete));

    // Completed is terminal until reset
    controller.tick();
    controller.start();
    assert_eq!(controller.total_elapsed_seconds(), 5);
    assert_eq!(controller.status(), ExecutionStatus::Completed);
}

#[test]
fn test_countdown_covers_last_five_seconds() {
    let mut controller = ExecutionController::new(workout(&[(7, 0.5, 0.6)]), 200).unwrap();
    let events = recorder(&mut controller);

    controller.start();
    for _ in 0..7 {
        controller.tick();
    }

    let events = events.lock().unwrap();
    let countdowns = events.iter().filter(|e| **e == WorkoutEvent::Countdown).count();
    let ticks = events.iter().filter(|e| **e == WorkoutEvent::Tick).count();
    assert_eq!(countdowns, 5);
    assert_eq!(ticks, 6);
    assert_eq!(events.first(), Some(&WorkoutEvent::Start));
    assert_eq!(events.last(), Some(&WorkoutEvent::Complete));
}

#[test]
fn test_target_scales_with_ftp() {
    let mut controller = ExecutionController::new(workout(&[(60, 0.45, 0.55)]), 200).unwrap();

    assert_eq!(controller.target_power_range(), PowerRange { low: 90, high: 110 });

    controller.set_ftp(250);
    assert_eq!(controller.ftp(), 250);
    assert_eq!(controller.target_power_range().low, 113);
}

#[test]
fn test_power_zone_check_is_inclusive() {
    let controller = ExecutionController::new(workout(&[(60, 0.9, 1.0)]), 200).unwrap();

    assert_eq!(controller.is_power_in_zone(179.0), ZoneStatus::Low);
    assert_eq!(controller.is_power_in_zone(180.0), ZoneStatus::InZone);
    assert_eq!(controller.is_power_in_zone(200.0), ZoneStatus::InZone);
    assert_eq!(controller.is_power_in_zone(201.0), ZoneStatus::High);
}

#[test]
fn test_pause_resume_and_toggle() {
    let mut controller = ExecutionController::new(workout(&[(60, 0.5, 0.6)]), 200).unwrap();
    let events = recorder(&mut controller);

    controller.pause();
    assert_eq!(controller.status(), ExecutionStatus::Idle);

    controller.start();
    controller.tick();
    controller.toggle();
    assert_eq!(controller.status(), ExecutionStatus::Paused);
    controller.tick();
    assert_eq!(controller.total_elapsed_seconds(), 1);

    controller.toggle();
    assert!(controller.is_running());

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            WorkoutEvent::Start,
            WorkoutEvent::Tick,
            WorkoutEvent::Pause,
            WorkoutEvent::Resume
        ]
    );
}

#[test]
fn test_reset_zeroes_counters() {
    let mut controller = ExecutionController::new(workout(&[(2, 0.5, 0.6), (3, 0.9, 1.0)]), 200).unwrap();
    controller.start();
    for _ in 0..3 {
        controller.tick();
    }

    controller.reset();

    assert_eq!(controller.status(), ExecutionStatus::Idle);
    assert_eq!(controller.segment_index(), 0);
    assert_eq!(controller.segment_elapsed_seconds(), 0);
    assert_eq!(controller.total_elapsed_seconds(), 0);
    assert_eq!(controller.total_remaining_seconds(), 5);
}

#[test]
fn test_unsubscribe_and_destroy() {
    let mut controller = ExecutionController::new(workout(&[(60, 0.5, 0.6)]), 200).unwrap();
    let first = controller.subscribe(|_, _| {});
    controller.subscribe(|_, _| {});

    assert!(controller.unsubscribe(first));
    assert!(!controller.unsubscribe(first));
    assert_eq!(controller.listener_count(), 1);

    controller.start();
    controller.destroy();
    assert_eq!(controller.listener_count(), 0);
    assert!(!controller.is_running());
}

#[test]
fn test_snapshot_reflects_state() {
    let mut controller = ExecutionController::new(workout(&[(4, 0.5, 0.6), (6, 1.0, 1.1)]), 300).unwrap();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    controller.subscribe(move |event, snapshot| {
        if event == WorkoutEvent::SegmentChange {
            *sink.lock().unwrap() = Some(snapshot.clone());
        }
    });

    controller.start();
    for _ in 0..4 {
        controller.tick();
    }

    let snapshot = seen.lock().unwrap().clone().unwrap();
    assert_eq!(snapshot.segment_index, 1);
    assert_eq!(snapshot.segment_name, "Segment 2");
    assert_eq!(snapshot.segment_remaining_seconds, 6);
    assert_eq!(snapshot.total_remaining_seconds, 6);
    assert_eq!(snapshot.target_power, PowerRange { low: 300, high: 330 });
    assert!((snapshot.progress - 0.4).abs() < 1e-9);
    assert_eq!(controller.next_segment(), None);
}

#[test]
fn test_empty_workout_is_rejected() {
    let result = ExecutionController::new(workout(&[]), 200);
    assert!(matches!(result, Err(WorkoutError::InvalidWorkout(_))));
}
