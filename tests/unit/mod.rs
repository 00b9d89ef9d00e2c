//! Unit test modules.

mod catalog_test;
mod measurement_bounds_test;
mod ride_summary_test;
mod workout_engine_test;
mod zones_test;
