//! Sensor connection interface.
//!
//! Real adapters (BLE heart rate straps, power meters, trainers) live outside
//! this crate. They only need to deliver well-formed samples to registered
//! listeners; range validation happens in the [`MeasurementStore`].
//!
//! [`MeasurementStore`]: super::store::MeasurementStore

use super::store::{Channel, Measurement};

/// Callback invoked for every sample a sensor produces.
pub type SampleListener = Box<dyn FnMut(Measurement) + Send>;

/// A connected sensor delivering samples for one channel.
pub trait SensorConnection {
    /// Channel this sensor reports.
    fn channel(&self) -> Channel;

    /// Register a callback for incoming samples.
    fn add_listener(&mut self, listener: SampleListener);

    /// Disconnect and stop delivering samples.
    fn disconnect(&mut self);

    /// Whether the sensor is still delivering samples.
    fn is_connected(&self) -> bool;
}

/// In-process sensor that forwards whatever values it is fed.
///
/// Used by the CLI's simulated ride and by tests in place of a real adapter.
pub struct SimulatedSensor {
    channel: Channel,
    listeners: Vec<SampleListener>,
    connected: bool,
}

impl SimulatedSensor {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            listeners: Vec::new(),
            connected: true,
        }
    }

    /// Deliver a sample to every listener. Ignored once disconnected.
    pub fn emit(&mut self, sample: Measurement) {
        if !self.connected {
            return;
        }
        for listener in self.listeners.iter_mut() {
            listener(sample);
        }
    }
}

impl SensorConnection for SimulatedSensor {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn add_listener(&mut self, listener: SampleListener) {
        self.listeners.push(listener);
    }

    fn disconnect(&mut self) {
        if self.connected {
            tracing::info!(channel = %self.channel, "Sensor disconnected");
        }
        self.connected = false;
        self.listeners.clear();
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
