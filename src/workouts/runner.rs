//! Tick scheduler for the execution controller.
//!
//! Owns the one timer that calls `tick()` while a workout runs. The timer is
//! a Tokio task; every method that may spawn it must be called from within a
//! Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::engine::ExecutionController;

/// Default tick period: one second of workout time per tick.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Runs an [`ExecutionController`] on a fixed-period timer.
///
/// Listeners registered on the controller are called from the timer task
/// while the controller is locked, so they must not call back into the
/// runner.
pub struct WorkoutRunner {
    controller: Arc<Mutex<ExecutionController>>,
    ticker: Option<JoinHandle<()>>,
    period: Duration,
}

impl WorkoutRunner {
    pub fn new(controller: ExecutionController, period: Duration) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            ticker: None,
            period,
        }
    }

    /// Runner ticking once per second.
    pub fn with_default_period(controller: ExecutionController) -> Self {
        Self::new(controller, DEFAULT_TICK_INTERVAL)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Shared handle to the controller.
    pub fn controller(&self) -> Arc<Mutex<ExecutionController>> {
        Arc::clone(&self.controller)
    }

    /// Run `f` with the controller locked.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut ExecutionController) -> R) -> R {
        f(&mut *lock(&self.controller))
    }

    pub fn start(&mut self) {
        let running = self.with_controller(|c| {
            c.start();
            c.is_running()
        });
        if running {
            self.ensure_ticker();
        }
    }

    pub fn resume(&mut self) {
        let running = self.with_controller(|c| {
            c.resume();
            c.is_running()
        });
        if running {
            self.ensure_ticker();
        }
    }

    pub fn pause(&mut self) {
        self.stop_ticker();
        self.with_controller(|c| c.pause());
    }

    pub fn toggle(&mut self) {
        if self.with_controller(|c| c.is_running()) {
            self.pause();
        } else {
            self.resume();
        }
    }

    pub fn reset(&mut self) {
        self.stop_ticker();
        self.with_controller(|c| c.reset());
    }

    /// Stop the timer and drop every subscriber.
    pub fn destroy(&mut self) {
        self.stop_ticker();
        self.with_controller(|c| c.destroy());
    }

    /// Whether the timer task is alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Wait until the timer task ends on its own (workout completed or
    /// paused elsewhere).
    pub async fn wait(&mut self) {
        if let Some(handle) = self.ticker.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    tracing::warn!("Workout ticker ended abnormally: {}", e);
                }
            }
        }
    }

    fn ensure_ticker(&mut self) {
        if self.is_ticking() {
            return;
        }

        let controller = Arc::clone(&self.controller);
        let period = self.period;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let mut guard = lock(&controller);
                if !guard.is_running() {
                    break;
                }
                guard.tick();
                if !guard.is_running() {
                    break;
                }
            }
            tracing::debug!("Workout ticker stopped");
        }));
        tracing::debug!("Workout ticker started ({:?} period)", period);
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

impl Drop for WorkoutRunner {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

fn lock(controller: &Mutex<ExecutionController>) -> MutexGuard<'_, ExecutionController> {
    controller.lock().unwrap_or_else(PoisonError::into_inner)
}
