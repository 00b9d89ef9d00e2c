//! Workout execution controller.
//!
//! Drives a structured workout one second at a time. The controller itself
//! never sleeps: something outside calls [`ExecutionController::tick`] once
//! per second while it is running (see [`super::runner::WorkoutRunner`]), so
//! tests can step it synchronously.

use serde::{Deserialize, Serialize};

use crate::metrics::zones::{PowerRange, ZoneStatus};
use crate::workouts::types::{StructuredWorkout, WorkoutError, WorkoutSegment};

/// Seconds before a segment ends during which countdown events fire.
pub const COUNTDOWN_SECONDS: u32 = 5;

/// Lifecycle of a controller: `Idle -> Running <-> Paused -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    #[default]
    Idle,
    Running,
    Paused,
    /// Terminal until `reset`
    Completed,
}

/// Events delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkoutEvent {
    Start,
    Pause,
    Resume,
    Tick,
    SegmentChange,
    Countdown,
    Complete,
}

impl WorkoutEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutEvent::Start => "start",
            WorkoutEvent::Pause => "pause",
            WorkoutEvent::Resume => "resume",
            WorkoutEvent::Tick => "tick",
            WorkoutEvent::SegmentChange => "segment-change",
            WorkoutEvent::Countdown => "countdown",
            WorkoutEvent::Complete => "complete",
        }
    }
}

impl std::fmt::Display for WorkoutEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full execution state handed to listeners with every event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub status: ExecutionStatus,
    pub is_running: bool,
    pub segment_index: usize,
    pub segment_name: String,
    pub segment_elapsed_seconds: u32,
    pub segment_remaining_seconds: u32,
    pub total_elapsed_seconds: u32,
    pub total_remaining_seconds: u32,
    /// Fraction of the whole workout done, 0.0 to 1.0
    pub progress: f64,
    pub target_power: PowerRange,
    pub ftp: u16,
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked synchronously for each event.
pub type EventListener = Box<dyn FnMut(WorkoutEvent, &ExecutionSnapshot) + Send>;

/// Segment-sequencing state machine for one workout.
pub struct ExecutionController {
    workout: StructuredWorkout,
    ftp: u16,
    status: ExecutionStatus,
    segment_index: usize,
    segment_elapsed_seconds: u32,
    total_elapsed_seconds: u32,
    listeners: Vec<(SubscriptionId, EventListener)>,
    next_subscription: u64,
}

impl ExecutionController {
    /// Create an idle controller. Fails if the workout is structurally invalid.
    pub fn new(workout: StructuredWorkout, ftp: u16) -> Result<Self, WorkoutError> {
        workout.validate()?;

        tracing::info!("Workout loaded: {} ({} segments)", workout.id, workout.segments.len());
        Ok(Self {
            workout,
            ftp,
            status: ExecutionStatus::Idle,
            segment_index: 0,
            segment_elapsed_seconds: 0,
            total_elapsed_seconds: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Start running. No-op if running or completed.
    pub fn start(&mut self) {
        self.run(WorkoutEvent::Start);
    }

    /// Continue after a pause. Same transition as `start`, different event.
    pub fn resume(&mut self) {
        self.run(WorkoutEvent::Resume);
    }

    fn run(&mut self, event: WorkoutEvent) {
        match self.status {
            ExecutionStatus::Running | ExecutionStatus::Completed => return,
            ExecutionStatus::Idle | ExecutionStatus::Paused => {}
        }

        self.status = ExecutionStatus::Running;
        tracing::info!("Workout {} ({})", event, self.workout.id);
        self.emit(event);
    }

    /// Pause without touching counters. No-op unless running.
    pub fn pause(&mut self) {
        if self.status != ExecutionStatus::Running {
            return;
        }

        self.status = ExecutionStatus::Paused;
        tracing::info!("Workout paused at {}s", self.total_elapsed_seconds);
        self.emit(WorkoutEvent::Pause);
    }

    /// Pause if running, else resume.
    pub fn toggle(&mut self) {
        if self.is_running() {
            self.pause();
        } else {
            self.resume();
        }
    }

    /// Advance one second. Ignored unless running.
    pub fn tick(&mut self) {
        if self.status != ExecutionStatus::Running {
            return;
        }

        self.segment_elapsed_seconds += 1;
        self.total_elapsed_seconds += 1;

        let remaining = self.segment_remaining_seconds();
        if remaining > 0 && remaining <= COUNTDOWN_SECONDS {
            self.emit(WorkoutEvent::Countdown);
        }

        if remaining > 0 {
            self.emit(WorkoutEvent::Tick);
        } else if self.segment_index + 1 < self.workout.segments.len() {
            self.segment_index += 1;
            self.segment_elapsed_seconds = 0;
            tracing::debug!(
                "Segment {} started: {}",
                self.segment_index,
                self.current_segment().name
            );
            self.emit(WorkoutEvent::SegmentChange);
        } else {
            self.status = ExecutionStatus::Completed;
            tracing::info!(
                "Workout completed: {} after {}s",
                self.workout.id,
                self.total_elapsed_seconds
            );
            self.emit(WorkoutEvent::Complete);
        }
    }

    /// Back to idle with all counters zeroed, from any state.
    pub fn reset(&mut self) {
        self.status = ExecutionStatus::Idle;
        self.segment_index = 0;
        self.segment_elapsed_seconds = 0;
        self.total_elapsed_seconds = 0;
        tracing::info!("Workout reset: {}", self.workout.id);
    }

    /// Stop running and drop every subscriber.
    pub fn destroy(&mut self) {
        if self.status == ExecutionStatus::Running {
            self.status = ExecutionStatus::Paused;
        }
        self.listeners.clear();
        tracing::debug!("Workout controller destroyed: {}", self.workout.id);
    }

    pub fn set_ftp(&mut self, ftp: u16) {
        self.ftp = ftp;
    }

    pub fn ftp(&self) -> u16 {
        self.ftp
    }

    /// Register a listener. Listeners run in subscription order.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(WorkoutEvent, &ExecutionSnapshot) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove one listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Current segment target in watts at the current FTP.
    pub fn target_power_range(&self) -> PowerRange {
        self.current_segment().target.power_range(self.ftp)
    }

    /// Compare a power reading against the current target (bounds inclusive).
    pub fn is_power_in_zone(&self, power_watts: f64) -> ZoneStatus {
        self.target_power_range().classify(power_watts)
    }

    pub fn workout(&self) -> &StructuredWorkout {
        &self.workout
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == ExecutionStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn segment_elapsed_seconds(&self) -> u32 {
        self.segment_elapsed_seconds
    }

    pub fn total_elapsed_seconds(&self) -> u32 {
        self.total_elapsed_seconds
    }

    pub fn current_segment(&self) -> &WorkoutSegment {
        // segment_index is kept within bounds and segments is never empty
        &self.workout.segments[self.segment_index]
    }

    pub fn next_segment(&self) -> Option<&WorkoutSegment> {
        self.workout.segments.get(self.segment_index + 1)
    }

    pub fn segment_remaining_seconds(&self) -> u32 {
        self.current_segment()
            .duration_seconds
            .saturating_sub(self.segment_elapsed_seconds)
    }

    pub fn total_remaining_seconds(&self) -> u32 {
        self.workout
            .total_duration_seconds
            .saturating_sub(self.total_elapsed_seconds)
    }

    /// Fraction of the workout done, 0.0 to 1.0.
    pub fn progress(&self) -> f64 {
        let total = self.workout.total_duration_seconds;
        if total == 0 {
            return 0.0;
        }
        (self.total_elapsed_seconds as f64 / total as f64).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        ExecutionSnapshot {
            status: self.status,
            is_running: self.is_running(),
            segment_index: self.segment_index,
            segment_name: self.current_segment().name.clone(),
            segment_elapsed_seconds: self.segment_elapsed_seconds,
            segment_remaining_seconds: self.segment_remaining_seconds(),
            total_elapsed_seconds: self.total_elapsed_seconds,
            total_remaining_seconds: self.total_remaining_seconds(),
            progress: self.progress(),
            target_power: self.target_power_range(),
            ftp: self.ftp,
        }
    }

    fn emit(&mut self, event: WorkoutEvent) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(event, &snapshot);
        }
    }
}

impl std::fmt::Debug for ExecutionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionController")
            .field("workout", &self.workout.id)
            .field("ftp", &self.ftp)
            .field("status", &self.status)
            .field("segment_index", &self.segment_index)
            .field("segment_elapsed_seconds", &self.segment_elapsed_seconds)
            .field("total_elapsed_seconds", &self.total_elapsed_seconds)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
