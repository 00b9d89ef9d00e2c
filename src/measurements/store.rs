//! Bounds-validated, append-only measurement series.
//!
//! Each session keeps three independent series (power, heart rate, cadence).
//! Samples outside a channel's physical range are treated as sensor noise and
//! dropped without error.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Exclusive upper bound for power samples in watts.
pub const MAX_POWER_WATTS: f64 = 3000.0;
/// Exclusive upper bound for heart rate samples in bpm.
pub const MAX_HEART_RATE_BPM: f64 = 300.0;
/// Exclusive upper bound for cadence samples in rpm.
pub const MAX_CADENCE_RPM: f64 = 300.0;

/// A single timestamped sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Sample value in the channel's unit
    pub value: f64,
}

impl Measurement {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Power,
    Heartrate,
    Cadence,
}

impl Channel {
    /// Name used when dispatching by string and when persisting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Power => "power",
            Channel::Heartrate => "heartrate",
            Channel::Cadence => "cadence",
        }
    }

    /// Get all channels.
    pub fn all() -> [Channel; 3] {
        [Channel::Power, Channel::Heartrate, Channel::Cadence]
    }

    /// Whether a value is physically plausible for this channel.
    ///
    /// Power and cadence accept zero (a stopped bike), heart rate does not.
    pub fn accepts(&self, value: f64) -> bool {
        match self {
            Channel::Power => (0.0..MAX_POWER_WATTS).contains(&value),
            Channel::Heartrate => value > 0.0 && value < MAX_HEART_RATE_BPM,
            Channel::Cadence => (0.0..MAX_CADENCE_RPM).contains(&value),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power" => Ok(Channel::Power),
            "heartrate" => Ok(Channel::Heartrate),
            "cadence" => Ok(Channel::Cadence),
            other => Err(MeasurementError::UnknownChannel(other.to_string())),
        }
    }
}

/// The three measurement series of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub power: Vec<Measurement>,
    pub heartrate: Vec<Measurement>,
    pub cadence: Vec<Measurement>,
}

impl Measurements {
    /// Get the series for a channel.
    pub fn channel(&self, channel: Channel) -> &[Measurement] {
        match channel {
            Channel::Power => &self.power,
            Channel::Heartrate => &self.heartrate,
            Channel::Cadence => &self.cadence,
        }
    }

    /// Power values in sample order.
    pub fn power_values(&self) -> Vec<f64> {
        self.power.iter().map(|m| m.value).collect()
    }

    /// Heart rate values in sample order.
    pub fn heartrate_values(&self) -> Vec<f64> {
        self.heartrate.iter().map(|m| m.value).collect()
    }

    /// Total number of samples across all channels.
    pub fn total_len(&self) -> usize {
        self.power.len() + self.heartrate.len() + self.cadence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total_len() == 0
    }
}

/// Per-session measurement store.
///
/// Owned by exactly one session; not meant to be shared between sessions.
#[derive(Debug, Default)]
pub struct MeasurementStore {
    series: Measurements,
}

impl MeasurementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a power sample. Returns `false` if the sample was dropped.
    pub fn add_power(&mut self, sample: Measurement) -> bool {
        self.push(Channel::Power, sample)
    }

    /// Append a heart rate sample. Returns `false` if the sample was dropped.
    pub fn add_heartrate(&mut self, sample: Measurement) -> bool {
        self.push(Channel::Heartrate, sample)
    }

    /// Append a cadence sample. Returns `false` if the sample was dropped.
    pub fn add_cadence(&mut self, sample: Measurement) -> bool {
        self.push(Channel::Cadence, sample)
    }

    /// Dispatch a sample by channel name.
    ///
    /// An unrecognized name is a caller bug and is reported as
    /// [`MeasurementError::UnknownChannel`]; an out-of-range value is not.
    pub fn add(&mut self, channel: &str, sample: Measurement) -> Result<bool, MeasurementError> {
        let channel = channel.parse::<Channel>()?;
        Ok(self.add_to(channel, sample))
    }

    /// Append a sample to a typed channel.
    pub fn add_to(&mut self, channel: Channel, sample: Measurement) -> bool {
        match channel {
            Channel::Power => self.add_power(sample),
            Channel::Heartrate => self.add_heartrate(sample),
            Channel::Cadence => self.add_cadence(sample),
        }
    }

    fn push(&mut self, channel: Channel, sample: Measurement) -> bool {
        if !channel.accepts(sample.value) {
            tracing::trace!(%channel, value = sample.value, "Dropping out-of-range sample");
            return false;
        }

        let series = match channel {
            Channel::Power => &mut self.series.power,
            Channel::Heartrate => &mut self.series.heartrate,
            Channel::Cadence => &mut self.series.cadence,
        };
        series.push(sample);
        true
    }

    pub fn power(&self) -> &[Measurement] {
        &self.series.power
    }

    pub fn heartrate(&self) -> &[Measurement] {
        &self.series.heartrate
    }

    pub fn cadence(&self) -> &[Measurement] {
        &self.series.cadence
    }

    /// Most recent power value, if any.
    pub fn latest_power(&self) -> Option<f64> {
        self.series.power.last().map(|m| m.value)
    }

    /// Total number of stored samples.
    pub fn len(&self) -> usize {
        self.series.total_len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Copy the current series for persistence.
    pub fn snapshot(&self) -> Measurements {
        self.series.clone()
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        self.series = Measurements::default();
    }
}

/// Measurement errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeasurementError {
    #[error("Unknown measurement channel: {0}")]
    UnknownChannel(String),
}
