//! Integration test modules.

mod analytics_integration_test;
mod ride_recording_test;
mod workout_execution_test;
