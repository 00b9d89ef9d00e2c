//! Time-in-zone distribution over irregular time series.
//!
//! Durations come from consecutive-sample timestamp deltas. A pair with a
//! non-positive delta (duplicate or out-of-order timestamps) or without a
//! value on the later sample contributes nothing, not even to the total.

use serde::{Deserialize, Serialize};

use crate::measurements::Measurement;
use crate::metrics::zones::ZoneBand;

/// Time spent in one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneTime {
    /// Zone number (1-based)
    pub zone: u8,
    /// Zone name
    pub name: String,
    /// Accumulated time in milliseconds
    pub duration_ms: i64,
    /// Share of total time in percent (0-100)
    pub percent: f64,
}

/// Time-in-zone distribution for one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDistribution {
    /// One entry per zone, lowest first
    pub zones: Vec<ZoneTime>,
    /// Total classified time in milliseconds
    pub total_ms: i64,
}

impl ZoneDistribution {
    /// Empty distribution over the given zone table.
    pub fn empty(bands: &[ZoneBand]) -> Self {
        Self {
            zones: bands
                .iter()
                .map(|band| ZoneTime {
                    zone: band.zone,
                    name: band.name.to_string(),
                    duration_ms: 0,
                    percent: 0.0,
                })
                .collect(),
            total_ms: 0,
        }
    }

    /// Get the entry for a zone number.
    pub fn zone(&self, zone: u8) -> Option<&ZoneTime> {
        self.zones.iter().find(|z| z.zone == zone)
    }

    /// Merge another distribution over the same table and recompute percentages.
    pub fn merge(&mut self, other: &ZoneDistribution) {
        for (mine, theirs) in self.zones.iter_mut().zip(other.zones.iter()) {
            mine.duration_ms += theirs.duration_ms;
        }
        self.total_ms += other.total_ms;
        self.recompute_percentages();
    }

    fn recompute_percentages(&mut self) {
        let total = self.total_ms;
        for zone in self.zones.iter_mut() {
            zone.percent = if total > 0 {
                zone.duration_ms as f64 / total as f64 * 100.0
            } else {
                0.0
            };
        }
    }
}

/// Accumulate time in zone for `(timestamp_ms, value)` pairs.
///
/// Each value is classified as `value * 100 / reference` against `bands`.
/// A non-positive `reference` yields an empty distribution.
pub fn zone_distribution<I>(samples: I, reference: f64, bands: &[ZoneBand]) -> ZoneDistribution
where
    I: IntoIterator<Item = (i64, Option<f64>)>,
{
    let mut distribution = ZoneDistribution::empty(bands);
    if reference <= 0.0 {
        return distribution;
    }

    let mut previous_ts: Option<i64> = None;
    for (timestamp, value) in samples {
        let Some(prev) = previous_ts.replace(timestamp) else {
            continue;
        };

        let duration = timestamp - prev;
        let Some(value) = value else {
            continue;
        };
        if duration <= 0 {
            continue;
        }

        let percent = value * 100.0 / reference;
        if let Some(index) = bands.iter().position(|band| band.contains(percent)) {
            distribution.zones[index].duration_ms += duration;
            distribution.total_ms += duration;
        }
    }

    distribution.recompute_percentages();
    distribution
}

/// Time-in-zone distribution for a measurement series.
pub fn measurement_distribution(
    samples: &[Measurement],
    reference: f64,
    bands: &[ZoneBand],
) -> ZoneDistribution {
    zone_distribution(
        samples.iter().map(|m| (m.timestamp, Some(m.value))),
        reference,
        bands,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::zones::{HEART_RATE_ZONE_TABLE, POWER_ZONE_TABLE};

    #[test]
    fn test_distribution_uses_timestamp_deltas() {
        // FTP 200: 100 W -> Recovery, 200 W -> Threshold
        let samples = vec![
            (0, Some(100.0)),
            (1_000, Some(100.0)),
            (3_000, Some(200.0)),
            (4_000, Some(200.0)),
        ];

        let dist = zone_distribution(samples, 200.0, &POWER_ZONE_TABLE);

        assert_eq!(dist.total_ms, 4_000);
        assert_eq!(dist.zone(1).unwrap().duration_ms, 1_000);
        assert_eq!(dist.zone(4).unwrap().duration_ms, 3_000);
        assert!((dist.zone(4).unwrap().percent - 75.0).abs() < 1e-9);
        assert!((dist.zone(1).unwrap().percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_gaps_and_missing_values_are_skipped() {
        let samples = vec![
            (1_000, Some(150.0)),
            (1_000, Some(150.0)), // duplicate timestamp
            (500, Some(150.0)),   // out of order
            (1_500, None),        // missing value
            (2_500, Some(150.0)),
        ];

        let dist = zone_distribution(samples, 200.0, &POWER_ZONE_TABLE);

        assert_eq!(dist.total_ms, 1_000);
        assert_eq!(dist.zone(3).unwrap().duration_ms, 1_000);
    }

    #[test]
    fn test_empty_and_zero_reference() {
        let empty = zone_distribution(Vec::new(), 200.0, &POWER_ZONE_TABLE);
        assert_eq!(empty.total_ms, 0);
        assert!(empty.zones.iter().all(|z| z.percent == 0.0));
        assert_eq!(empty.zones.len(), 7);

        let samples = vec![(0, Some(100.0)), (1_000, Some(100.0))];
        let zero_ref = zone_distribution(samples, 0.0, &POWER_ZONE_TABLE);
        assert_eq!(zero_ref.total_ms, 0);
    }

    #[test]
    fn test_merge_recomputes_percentages() {
        let hr = |values: &[(i64, f64)]| {
            let series: Vec<Measurement> = values
                .iter()
                .map(|&(ts, v)| Measurement::new(ts, v))
                .collect();
            measurement_distribution(&series, 200.0, &HEART_RATE_ZONE_TABLE)
        };

        let mut total = hr(&[(0, 100.0), (1_000, 100.0)]);
        total.merge(&hr(&[(0, 190.0), (3_000, 190.0)]));

        assert_eq!(total.total_ms, 4_000);
        assert!((total.zone(1).unwrap().percent - 25.0).abs() < 1e-9);
        assert!((total.zone(5).unwrap().percent - 75.0).abs() < 1e-9);
    }
}
