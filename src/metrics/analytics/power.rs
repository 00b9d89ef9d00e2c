//! Power metrics over 1 Hz sample series.
//!
//! Normalized Power, mechanical work, zone counts and FTP estimation from
//! field tests.

use serde::{Deserialize, Serialize};

use crate::metrics::smoothing::{NormalizedPowerCalculator, NP_WINDOW_SAMPLES};
use crate::metrics::zones::PowerZone;

/// Arithmetic mean, `None` for an empty series.
pub fn average(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Largest value, `None` for an empty series.
pub fn maximum(samples: &[f64]) -> Option<f64> {
    samples.iter().copied().reduce(f64::max)
}

/// Normalized Power.
///
/// With fewer than 30 samples there is no full rolling window and the plain
/// average is returned (0 for an empty series). Otherwise: 30-sample
/// trailing average at every index from 29 on, raised to the 4th power,
/// averaged, 4th root, rounded to the nearest watt.
pub fn calculate_np(samples: &[f64]) -> f64 {
    if samples.len() < NP_WINDOW_SAMPLES {
        return average(samples).unwrap_or(0.0);
    }

    let mut calculator = NormalizedPowerCalculator::new();
    let mut np = None;
    for &power in samples {
        np = calculator.add(power);
    }
    np.unwrap_or(0.0)
}

/// Total work in kilojoules, assuming one sample per second.
pub fn calculate_work(samples: &[f64]) -> u32 {
    let joules: f64 = samples.iter().sum();
    (joules / 1000.0).round().max(0.0) as u32
}

/// Sample count per zone in the 6-zone analytics view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    /// Counts indexed like [`PowerZone::ANALYTICS`]
    pub counts: [usize; 6],
}

impl ZoneCounts {
    /// Count for one zone. Neuromuscular is folded into Anaerobic.
    pub fn count(&self, zone: PowerZone) -> usize {
        let index = zone.index().min(self.counts.len() - 1);
        self.counts[index]
    }

    /// Total number of classified samples.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(zone, count)` pairs, lowest zone first.
    pub fn iter(&self) -> impl Iterator<Item = (PowerZone, usize)> + '_ {
        PowerZone::ANALYTICS.into_iter().zip(self.counts.iter().copied())
    }
}

/// Classify each sample by `value / ftp` into the six analytics zones.
///
/// An FTP of zero classifies nothing.
pub fn calculate_zones(samples: &[f64], ftp: u16) -> ZoneCounts {
    let mut zones = ZoneCounts::default();
    if ftp == 0 {
        return zones;
    }

    for &power in samples {
        if let Some(zone) = PowerZone::analytics_from_percent(power * 100.0 / ftp as f64) {
            zones.counts[zone.index()] += 1;
        }
    }
    zones
}

/// Field test used to estimate FTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestProtocol {
    /// 95% of 20-minute power.
    TwentyMinute,
    /// 85% of 5-minute power.
    FiveMinute,
}

impl TestProtocol {
    /// Fraction of the test's average power taken as FTP.
    pub fn factor(&self) -> f64 {
        match self {
            TestProtocol::TwentyMinute => 0.95,
            TestProtocol::FiveMinute => 0.85,
        }
    }

    /// Required test duration in seconds.
    pub fn duration_seconds(&self) -> u32 {
        match self {
            TestProtocol::TwentyMinute => 1200,
            TestProtocol::FiveMinute => 300,
        }
    }
}

/// Estimate FTP from a field test's average power.
pub fn estimate_ftp(protocol: TestProtocol, average_power: f64) -> u16 {
    (average_power * protocol.factor()).round().max(0.0) as u16
}
