//! Structured workouts: catalog, training plans and execution.

pub mod engine;
pub mod library;
pub mod plans;
pub mod runner;
pub mod types;

pub use engine::{
    EventListener, ExecutionController, ExecutionSnapshot, ExecutionStatus, SubscriptionId,
    WorkoutEvent,
};
pub use library::{
    all_workouts, find_workout, get_workout, segment_targets, workouts_by_category, SegmentPlan,
};
pub use plans::{
    all_plans, find_plan, get_plan, validate_plan, PlanError, PlanGoal, ScheduledWorkout,
    TrainingPlan, TrainingWeek,
};
pub use runner::{WorkoutRunner, DEFAULT_TICK_INTERVAL};
pub use types::{SegmentTarget, StructuredWorkout, WorkoutCategory, WorkoutError, WorkoutSegment};
