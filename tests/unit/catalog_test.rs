//! Unit tests for the workout library and plan catalog.

use spinlab::workouts::{
    all_plans, all_workouts, find_plan, get_plan, get_workout, segment_targets, validate_plan,
    PlanError, PlanGoal, WorkoutCategory,
};

#[test]
fn test_workout_durations_match_segments() {
    for workout in all_workouts() {
        let sum: u32 = workout.segments.iter().map(|s| s.duration_seconds).sum();
        assert_eq!(sum, workout.total_duration_seconds, "{}", workout.id);
        assert!(workout.segments.iter().all(|s| s.duration_seconds > 0));
        assert!(workout
            .segments
            .iter()
            .all(|s| s.target.power_low <= s.target.power_high));
    }
}

#[test]
fn test_plans_are_consistent() {
    assert!(!all_plans().is_empty());
    for plan in all_plans() {
        assert_eq!(validate_plan(plan), Ok(()), "{}", plan.id);
        assert_eq!(plan.weeks.len() as u32, plan.weeks_total);

        for (i, week) in plan.weeks.iter().enumerate() {
            assert_eq!(week.week_number, i as u32 + 1);
            for scheduled in &week.workouts {
                assert!(scheduled.day_of_week <= 6);
                assert!(scheduled.workout().is_some(), "{}", scheduled.workout_id);
            }
        }
    }
}

#[test]
fn test_plan_lookup() {
    let plan = find_plan("ftp-builder").unwrap();
    assert_eq!(plan.goal, PlanGoal::FtpBuild);
    assert_eq!(plan.weeks_total, 6);
    assert_eq!(
        plan.week(1).and_then(|w| w.workout_on(1)).map(|s| s.workout_id.as_str()),
        Some("ftp-test-20")
    );
    assert!(plan.week(7).is_none());

    assert!(get_plan("unknown").is_none());
    assert!(matches!(find_plan("unknown"), Err(PlanError::NotFound(_))));
}

#[test]
fn test_category_parsing() {
    assert_eq!("sweet-spot".parse::<WorkoutCategory>(), Ok(WorkoutCategory::SweetSpot));
    assert_eq!("VO2max".parse::<WorkoutCategory>(), Ok(WorkoutCategory::Vo2max));
    assert!("gravel".parse::<WorkoutCategory>().is_err());
}

#[test]
fn test_segment_targets_follow_ftp() {
    let workout = get_workout("ftp-test-20").unwrap();
    let at_200 = segment_targets(workout, 200);
    let at_300 = segment_targets(workout, 300);

    assert_eq!(at_200.len(), at_300.len());
    for (low, high) in at_200.iter().zip(&at_300) {
        assert_eq!(low.start_seconds, high.start_seconds);
        assert!(low.power.high <= high.power.high);
    }
}
