//! Metrics module for training calculations and zones.

pub mod analytics;
pub mod distribution;
pub mod smoothing;
pub mod zones;

pub use distribution::{measurement_distribution, zone_distribution, ZoneDistribution, ZoneTime};
pub use smoothing::{NormalizedPowerCalculator, RollingAverage};
pub use zones::{
    HRZones, PowerRange, PowerZone, PowerZones, ZoneBand, ZoneStatus, HEART_RATE_ZONE_TABLE,
    POWER_ZONE_TABLE,
};

pub use analytics::{AnalyticsEngine, AnalyticsError, Period, PersonalRecord, WorkoutSummary};
