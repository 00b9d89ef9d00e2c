//! Unit tests for measurement validation.

use spinlab::measurements::{Channel, Measurement, MeasurementError, MeasurementStore};

fn sample(value: f64) -> Measurement {
    Measurement::new(1_700_000_000_000, value)
}

#[test]
fn test_heart_rate_bounds() {
    let mut store = MeasurementStore::new();

    assert!(!store.add_heartrate(sample(0.0)));
    assert!(!store.add_heartrate(sample(-5.0)));
    assert!(store.add_heartrate(sample(0.5)));
    assert!(store.add_heartrate(sample(299.9)));
    assert!(!store.add_heartrate(sample(300.0)));

    assert_eq!(store.heartrate().len(), 2);
}

#[test]
fn test_power_bounds() {
    let mut store = MeasurementStore::new();

    assert!(store.add_power(sample(0.0)));
    assert!(store.add_power(sample(2999.0)));
    assert!(!store.add_power(sample(3000.0)));
    assert!(!store.add_power(sample(-1.0)));

    assert_eq!(store.power().len(), 2);
    assert_eq!(store.latest_power(), Some(2999.0));
}

#[test]
fn test_cadence_bounds() {
    let mut store = MeasurementStore::new();

    assert!(store.add_cadence(sample(0.0)));
    assert!(store.add_cadence(sample(120.0)));
    assert!(!store.add_cadence(sample(300.0)));
    assert!(!store.add_cadence(sample(f64::NAN)));

    assert_eq!(store.cadence().len(), 2);
}

#[test]
fn test_add_by_channel_name() {
    let mut store = MeasurementStore::new();

    assert_eq!(store.add("power", sample(250.0)), Ok(true));
    assert_eq!(store.add("heartrate", sample(400.0)), Ok(false));
    assert_eq!(store.add("cadence", sample(90.0)), Ok(true));
    assert_eq!(
        store.add("speed", sample(30.0)),
        Err(MeasurementError::UnknownChannel("speed".to_string()))
    );

    assert_eq!(store.len(), 2);
}

#[test]
fn test_snapshot_is_independent_of_store() {
    let mut store = MeasurementStore::new();
    store.add_to(Channel::Power, sample(200.0));

    let snapshot = store.snapshot();
    store.clear();

    assert!(store.is_empty());
    assert_eq!(snapshot.power.len(), 1);
    assert_eq!(snapshot.channel(Channel::Power)[0].value, 200.0);
}
