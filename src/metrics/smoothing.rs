//! Rolling averages and Normalized Power.

use std::collections::VecDeque;

/// Samples in the Normalized Power rolling window (30 s at 1 Hz).
pub const NP_WINDOW_SAMPLES: usize = 30;

/// Trailing mean over the last `window_size` samples.
#[derive(Debug)]
pub struct RollingAverage {
    buffer: VecDeque<f64>,
    window_size: usize,
    sum: f64,
}

impl RollingAverage {
    pub fn new(window_size: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(window_size),
            window_size,
            sum: 0.0,
        }
    }

    /// Window used by Normalized Power.
    pub fn thirty_second() -> Self {
        Self::new(NP_WINDOW_SAMPLES)
    }

    /// Push a sample; returns the mean of the current window.
    pub fn add(&mut self, value: f64) -> Option<f64> {
        self.buffer.push_back(value);
        self.sum += value;

        if self.buffer.len() > self.window_size {
            if let Some(old) = self.buffer.pop_front() {
                self.sum -= old;
            }
        }

        self.average()
    }

    pub fn average(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.sum / self.buffer.len() as f64)
        }
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.window_size
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.sum = 0.0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Streaming Normalized Power.
///
/// NP = 4th root of the mean of (30-sample trailing average)^4, counted from
/// the first full window onward.
#[derive(Debug)]
pub struct NormalizedPowerCalculator {
    rolling_avg: RollingAverage,
    sum_fourth_power: f64,
    // full windows seen
    count: u64,
}

impl NormalizedPowerCalculator {
    pub fn new() -> Self {
        Self {
            rolling_avg: RollingAverage::thirty_second(),
            sum_fourth_power: 0.0,
            count: 0,
        }
    }

    /// Add a power sample and return the current NP, if a full window exists.
    pub fn add(&mut self, power: f64) -> Option<f64> {
        if let Some(avg) = self.rolling_avg.add(power) {
            if self.rolling_avg.is_full() {
                self.sum_fourth_power += avg.powi(4);
                self.count += 1;
            }
        }

        self.normalized_power()
    }

    /// Current NP rounded to the nearest watt, once a full window exists.
    pub fn normalized_power(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }

        let avg_fourth_power = self.sum_fourth_power / self.count as f64;
        Some(avg_fourth_power.powf(0.25).round())
    }

    pub fn reset(&mut self) {
        self.rolling_avg.reset();
        self.sum_fourth_power = 0.0;
        self.count = 0;
    }
}

impl Default for NormalizedPowerCalculator {
    fn default() -> Self {
        Self::new()
    }
}
