//! Power and heart rate zone boundaries.
//!
//! A single boundary table backs every zone view in the crate:
//! - the 7-zone Coggan power model ([`PowerZone`]),
//! - the 6-zone analytics view, which folds Neuromuscular into an unbounded
//!   Anaerobic zone ([`PowerZone::ANALYTICS`]),
//! - the 3-state low/in-zone/high check against a segment target
//!   ([`PowerRange::classify`]).
//!
//! All bands are half-open `[min, max)` in percent of the reference value
//! (FTP for power, max HR for heart rate). The top band is unbounded.

use serde::{Deserialize, Serialize};

/// One band of a zone table, in percent of the reference value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneBand {
    /// Zone number (1-based)
    pub zone: u8,
    /// Zone name
    pub name: &'static str,
    /// Inclusive lower bound in percent
    pub min_percent: f64,
    /// Exclusive upper bound in percent (`None` = no upper limit)
    pub max_percent: Option<f64>,
}

impl ZoneBand {
    /// Whether a percentage falls inside `[min, max)`.
    pub fn contains(&self, percent: f64) -> bool {
        percent >= self.min_percent && self.max_percent.map_or(true, |max| percent < max)
    }
}

/// Coggan 7-zone power table (percent of FTP).
pub const POWER_ZONE_TABLE: [ZoneBand; 7] = [
    ZoneBand { zone: 1, name: "Recovery", min_percent: 0.0, max_percent: Some(55.0) },
    ZoneBand { zone: 2, name: "Endurance", min_percent: 55.0, max_percent: Some(75.0) },
    ZoneBand { zone: 3, name: "Tempo", min_percent: 75.0, max_percent: Some(90.0) },
    ZoneBand { zone: 4, name: "Threshold", min_percent: 90.0, max_percent: Some(105.0) },
    ZoneBand { zone: 5, name: "VO2max", min_percent: 105.0, max_percent: Some(120.0) },
    ZoneBand { zone: 6, name: "Anaerobic", min_percent: 120.0, max_percent: Some(150.0) },
    ZoneBand { zone: 7, name: "Neuromuscular", min_percent: 150.0, max_percent: None },
];

/// 5-zone heart rate table (percent of max HR).
///
/// Upper bounds sit at 60/70/80/90/100%. Zone 1 reaches down to zero and
/// zone 5 is left open so readings above a stale max HR still count.
pub const HEART_RATE_ZONE_TABLE: [ZoneBand; 5] = [
    ZoneBand { zone: 1, name: "Recovery", min_percent: 0.0, max_percent: Some(60.0) },
    ZoneBand { zone: 2, name: "Aerobic", min_percent: 60.0, max_percent: Some(70.0) },
    ZoneBand { zone: 3, name: "Tempo", min_percent: 70.0, max_percent: Some(80.0) },
    ZoneBand { zone: 4, name: "Threshold", min_percent: 80.0, max_percent: Some(90.0) },
    ZoneBand { zone: 5, name: "Maximum", min_percent: 90.0, max_percent: None },
];

/// Named power zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerZone {
    Recovery,
    Endurance,
    Tempo,
    Threshold,
    Vo2max,
    Anaerobic,
    Neuromuscular,
}

impl PowerZone {
    /// All seven zones, lowest first.
    pub const ALL: [PowerZone; 7] = [
        PowerZone::Recovery,
        PowerZone::Endurance,
        PowerZone::Tempo,
        PowerZone::Threshold,
        PowerZone::Vo2max,
        PowerZone::Anaerobic,
        PowerZone::Neuromuscular,
    ];

    /// Six-zone analytics view; Anaerobic is unbounded above.
    pub const ANALYTICS: [PowerZone; 6] = [
        PowerZone::Recovery,
        PowerZone::Endurance,
        PowerZone::Tempo,
        PowerZone::Threshold,
        PowerZone::Vo2max,
        PowerZone::Anaerobic,
    ];

    /// Position in the boundary table.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Zone number (1-7).
    pub fn number(&self) -> u8 {
        self.band().zone
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        self.band().name
    }

    /// Boundary band for this zone.
    pub fn band(&self) -> &'static ZoneBand {
        &POWER_ZONE_TABLE[self.index()]
    }

    /// Classify a percentage of FTP in the 7-zone model.
    pub fn from_percent(percent: f64) -> Option<PowerZone> {
        PowerZone::ALL
            .into_iter()
            .find(|zone| zone.band().contains(percent))
    }

    /// Classify a percentage of FTP in the 6-zone analytics view.
    pub fn analytics_from_percent(percent: f64) -> Option<PowerZone> {
        Self::from_percent(percent).map(|zone| match zone {
            PowerZone::Neuromuscular => PowerZone::Anaerobic,
            other => other,
        })
    }
}

impl std::fmt::Display for PowerZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Absolute power zone range for a given FTP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneRange {
    /// Zone number (1-7)
    pub zone: u8,
    /// Zone name
    pub name: String,
    /// Minimum watts (inclusive)
    pub min_watts: u16,
    /// Maximum watts (exclusive, `None` = no upper limit)
    pub max_watts: Option<u16>,
}

/// Coggan power zones resolved to watts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerZones {
    /// FTP the ranges were computed from
    pub ftp: u16,
    /// Zone ranges, lowest first
    pub ranges: Vec<ZoneRange>,
}

impl PowerZones {
    /// Calculate power zones from FTP.
    pub fn from_ftp(ftp: u16) -> Self {
        let watts = |percent: f64| (ftp as f64 * percent / 100.0).round() as u16;

        let ranges = POWER_ZONE_TABLE
            .iter()
            .map(|band| ZoneRange {
                zone: band.zone,
                name: band.name.to_string(),
                min_watts: watts(band.min_percent),
                max_watts: band.max_percent.map(watts),
            })
            .collect();

        Self { ftp, ranges }
    }

    /// Get the zone for a given power value.
    pub fn get_zone(&self, power: f64) -> Option<PowerZone> {
        if self.ftp == 0 {
            return None;
        }
        PowerZone::from_percent(power * 100.0 / self.ftp as f64)
    }

    /// Get the zone range for a zone number (1-7).
    pub fn get_zone_range(&self, zone: u8) -> Option<&ZoneRange> {
        self.ranges.iter().find(|r| r.zone == zone)
    }
}

/// Heart rate zone range for a given max HR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HRZoneRange {
    /// Zone number (1-5)
    pub zone: u8,
    /// Zone name
    pub name: String,
    /// Minimum BPM (inclusive)
    pub min_bpm: u16,
    /// Maximum BPM (exclusive, `None` = no upper limit)
    pub max_bpm: Option<u16>,
}

/// Heart rate zones as fractions of max HR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HRZones {
    /// Max HR the ranges were computed from
    pub max_hr: u16,
    /// Zone ranges, lowest first
    pub ranges: Vec<HRZoneRange>,
}

impl HRZones {
    /// Calculate heart rate zones from max HR.
    pub fn from_max_hr(max_hr: u16) -> Self {
        let bpm = |percent: f64| (max_hr as f64 * percent / 100.0).round() as u16;

        let ranges = HEART_RATE_ZONE_TABLE
            .iter()
            .map(|band| HRZoneRange {
                zone: band.zone,
                name: band.name.to_string(),
                min_bpm: bpm(band.min_percent),
                max_bpm: band.max_percent.map(bpm),
            })
            .collect();

        Self { max_hr, ranges }
    }

    /// Get the zone number (1-5) for a heart rate.
    pub fn get_zone(&self, hr: f64) -> Option<u8> {
        if self.max_hr == 0 {
            return None;
        }
        let percent = hr * 100.0 / self.max_hr as f64;
        HEART_RATE_ZONE_TABLE
            .iter()
            .find(|band| band.contains(percent))
            .map(|band| band.zone)
    }
}

/// Live power relative to a target range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneStatus {
    /// Below the target range
    Low,
    /// Within the target range (bounds inclusive)
    InZone,
    /// Above the target range
    High,
}

impl std::fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneStatus::Low => write!(f, "low"),
            ZoneStatus::InZone => write!(f, "in-zone"),
            ZoneStatus::High => write!(f, "high"),
        }
    }
}

/// Absolute target power range in watts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRange {
    pub low: u16,
    pub high: u16,
}

impl PowerRange {
    /// Resolve FTP fractions to watts, rounding to the nearest watt.
    pub fn from_fractions(power_low: f64, power_high: f64, ftp: u16) -> Self {
        Self {
            low: (power_low * ftp as f64).round() as u16,
            high: (power_high * ftp as f64).round() as u16,
        }
    }

    /// Classify a power reading against this range.
    pub fn classify(&self, power_watts: f64) -> ZoneStatus {
        if power_watts < self.low as f64 {
            ZoneStatus::Low
        } else if power_watts > self.high as f64 {
            ZoneStatus::High
        } else {
            ZoneStatus::InZone
        }
    }

    /// Midpoint of the range.
    pub fn midpoint(&self) -> u16 {
        ((self.low as u32 + self.high as u32) / 2) as u16
    }
}
