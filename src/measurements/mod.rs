//! Live sensor measurements for a single ride session.

pub mod sensor;
pub mod store;

pub use sensor::{SampleListener, SensorConnection, SimulatedSensor};
pub use store::{Channel, Measurement, MeasurementError, MeasurementStore, Measurements};
