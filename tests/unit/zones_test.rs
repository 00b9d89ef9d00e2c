//! Unit tests for zone boundaries.

use spinlab::metrics::analytics::calculate_zones;
use spinlab::metrics::{HRZones, PowerRange, PowerZone, PowerZones, ZoneStatus};

#[test]
fn test_power_zone_boundaries_at_ftp_200() {
    let zones = PowerZones::from_ftp(200);

    assert_eq!(zones.get_zone(0.0), Some(PowerZone::Recovery));
    assert_eq!(zones.get_zone(109.9), Some(PowerZone::Recovery));
    assert_eq!(zones.get_zone(110.0), Some(PowerZone::Endurance));
    assert_eq!(zones.get_zone(149.9), Some(PowerZone::Endurance));
    assert_eq!(zones.get_zone(150.0), Some(PowerZone::Tempo));
    assert_eq!(zones.get_zone(180.0), Some(PowerZone::Threshold));
    assert_eq!(zones.get_zone(210.0), Some(PowerZone::Vo2max));
    assert_eq!(zones.get_zone(240.0), Some(PowerZone::Anaerobic));
    assert_eq!(zones.get_zone(300.0), Some(PowerZone::Neuromuscular));
    assert_eq!(zones.get_zone(1500.0), Some(PowerZone::Neuromuscular));
}

#[test]
fn test_power_zone_ranges_at_ftp_300() {
    let zones = PowerZones::from_ftp(300);

    let threshold = zones.get_zone_range(4).unwrap();
    assert_eq!(threshold.min_watts, 270);
    assert_eq!(threshold.max_watts, Some(315));
    assert_eq!(zones.get_zone_range(7).unwrap().max_watts, None);
    assert!(zones.get_zone_range(8).is_none());
}

#[test]
fn test_zero_ftp_has_no_zone() {
    assert_eq!(PowerZones::from_ftp(0).get_zone(200.0), None);
}

#[test]
fn test_analytics_view_folds_neuromuscular() {
    let counts = calculate_zones(&[100.0, 110.0, 300.0, 900.0], 200);

    assert_eq!(counts.count(PowerZone::Recovery), 1);
    assert_eq!(counts.count(PowerZone::Endurance), 1);
    assert_eq!(counts.count(PowerZone::Anaerobic), 2);
    assert_eq!(counts.count(PowerZone::Neuromuscular), 2);
    assert_eq!(counts.total(), 4);
}

#[test]
fn test_heart_rate_zones() {
    let zones = HRZones::from_max_hr(200);

    assert_eq!(zones.get_zone(119.0), Some(1));
    assert_eq!(zones.get_zone(120.0), Some(2));
    assert_eq!(zones.get_zone(159.0), Some(3));
    assert_eq!(zones.get_zone(160.0), Some(4));
    assert_eq!(zones.get_zone(180.0), Some(5));
    assert_eq!(zones.get_zone(215.0), Some(5));

    assert_eq!(zones.ranges[0].min_bpm, 0);
    assert_eq!(zones.ranges[0].max_bpm, Some(120));
    assert_eq!(zones.ranges[4].max_bpm, None);
    assert_eq!(HRZones::from_max_hr(0).get_zone(150.0), None);
}

#[test]
fn test_three_state_check() {
    let range = PowerRange::from_fractions(0.88, 0.94, 250);

    assert_eq!(range, PowerRange { low: 220, high: 235 });
    assert_eq!(range.classify(219.9), ZoneStatus::Low);
    assert_eq!(range.classify(220.0), ZoneStatus::InZone);
    assert_eq!(range.classify(235.0), ZoneStatus::InZone);
    assert_eq!(range.classify(235.1), ZoneStatus::High);
    assert_eq!(range.midpoint(), 227);
}
