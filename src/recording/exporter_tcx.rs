//! TCX export of recorded workouts.
//!
//! The three measurement channels are merged per whole second into
//! trackpoints. Power goes into the TPX activity extension.

use std::collections::BTreeMap;
use std::io::Cursor;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::measurements::Measurement;
use crate::metrics::analytics::calculate_work;
use crate::recording::types::{ExportError, WorkoutRecord};

const NS_TCX: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2";
const NS_TPX: &str = "http://www.garmin.com/xmlschemas/ActivityExtension/v2";
const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str = "http://www.garmin.com/xmlschemas/TrainingCenterDatabase/v2 http://www.garmin.com/xmlschemas/TrainingCenterDatabasev2.xsd";

/// Samples of all channels that fall into one second.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Trackpoint {
    power: Option<f64>,
    heartrate: Option<f64>,
    cadence: Option<f64>,
}

/// Merge channels by whole second; the last sample in a second wins.
fn merge_trackpoints(record: &WorkoutRecord) -> BTreeMap<i64, Trackpoint> {
    let mut points: BTreeMap<i64, Trackpoint> = BTreeMap::new();

    let mut merge = |series: &[Measurement], set: fn(&mut Trackpoint, f64)| {
        for m in series {
            set(points.entry(m.timestamp.div_euclid(1000)).or_default(), m.value);
        }
    };
    merge(&record.measurements.power, |p, v| p.power = Some(v));
    merge(&record.measurements.heartrate, |p, v| p.heartrate = Some(v));
    merge(&record.measurements.cadence, |p, v| p.cadence = Some(v));

    points
}

/// Export a workout record to a TCX document.
pub fn export_tcx(record: &WorkoutRecord) -> Result<String, ExportError> {
    if record.measurements.is_empty() {
        return Err(ExportError::NoData);
    }

    let points = merge_trackpoints(record);
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    write_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut root = BytesStart::new("TrainingCenterDatabase");
    root.push_attribute(("xmlns", NS_TCX));
    root.push_attribute(("xmlns:ns3", NS_TPX));
    root.push_attribute(("xmlns:xsi", NS_XSI));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    write_event(&mut writer, Event::Start(root))?;
    write_event(&mut writer, Event::Start(BytesStart::new("Activities")))?;

    let mut activity = BytesStart::new("Activity");
    activity.push_attribute(("Sport", "Biking"));
    write_event(&mut writer, Event::Start(activity))?;
    write_element(&mut writer, "Id", &record.start_time.to_rfc3339())?;

    write_lap(&mut writer, record, &points)?;

    write_event(&mut writer, Event::End(BytesEnd::new("Activity")))?;
    write_event(&mut writer, Event::End(BytesEnd::new("Activities")))?;
    write_event(&mut writer, Event::End(BytesEnd::new("TrainingCenterDatabase")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| ExportError::XmlError(e.to_string()))
}

fn write_lap<W: std::io::Write>(
    writer: &mut Writer<W>,
    record: &WorkoutRecord,
    points: &BTreeMap<i64, Trackpoint>,
) -> Result<(), ExportError> {
    let summary = record.summary_or_compute();

    let mut lap = BytesStart::new("Lap");
    lap.push_attribute(("StartTime", record.start_time.to_rfc3339().as_str()));
    write_event(writer, Event::Start(lap))?;

    let total_seconds = match record.end_time {
        Some(_) => record.duration_seconds(),
        None => match (points.keys().next(), points.keys().next_back()) {
            (Some(first), Some(last)) => last - first,
            _ => 0,
        },
    };
    write_element(writer, "TotalTimeSeconds", &total_seconds.to_string())?;
    // Indoor trainer: no distance
    write_element(writer, "DistanceMeters", "0.0")?;
    // 1 kJ of mechanical work is roughly 1 kcal burned
    let calories = calculate_work(&record.measurements.power_values());
    write_element(writer, "Calories", &calories.to_string())?;

    if let Some(avg_hr) = summary.avg_heartrate {
        write_heart_rate_element(writer, "AverageHeartRateBpm", avg_hr)?;
    }
    if let Some(max_hr) = summary.max_heartrate {
        write_heart_rate_element(writer, "MaximumHeartRateBpm", max_hr)?;
    }

    write_element(writer, "Intensity", "Active")?;
    if let Some(avg_cadence) = summary.avg_cadence {
        write_element(writer, "Cadence", &format!("{:.0}", avg_cadence))?;
    }
    write_element(writer, "TriggerMethod", "Manual")?;

    write_event(writer, Event::Start(BytesStart::new("Track")))?;
    for (&second, point) in points {
        write_trackpoint(writer, second, point)?;
    }
    write_event(writer, Event::End(BytesEnd::new("Track")))?;

    if summary.avg_power.is_some() || summary.max_power.is_some() {
        write_event(writer, Event::Start(BytesStart::new("Extensions")))?;
        write_event(writer, Event::Start(BytesStart::new("ns3:LX")))?;
        if let Some(avg) = summary.avg_power {
            write_element(writer, "ns3:AvgWatts", &format!("{:.0}", avg))?;
        }
        if let Some(max) = summary.max_power {
            write_element(writer, "ns3:MaxWatts", &format!("{:.0}", max))?;
        }
        write_event(writer, Event::End(BytesEnd::new("ns3:LX")))?;
        write_event(writer, Event::End(BytesEnd::new("Extensions")))?;
    }

    write_event(writer, Event::End(BytesEnd::new("Lap")))
}

fn write_trackpoint<W: std::io::Write>(
    writer: &mut Writer<W>,
    second: i64,
    point: &Trackpoint,
) -> Result<(), ExportError> {
    write_event(writer, Event::Start(BytesStart::new("Trackpoint")))?;

    let time = DateTime::<Utc>::from_timestamp(second, 0)
        .ok_or_else(|| ExportError::XmlError(format!("timestamp out of range: {}", second)))?;
    write_element(writer, "Time", &time.to_rfc3339())?;

    if let Some(hr) = point.heartrate {
        write_heart_rate_element(writer, "HeartRateBpm", hr)?;
    }
    if let Some(cadence) = point.cadence {
        write_element(writer, "Cadence", &format!("{:.0}", cadence))?;
    }
    if let Some(power) = point.power {
        write_event(writer, Event::Start(BytesStart::new("Extensions")))?;
        write_event(writer, Event::Start(BytesStart::new("ns3:TPX")))?;
        write_element(writer, "ns3:Watts", &format!("{:.0}", power))?;
        write_event(writer, Event::End(BytesEnd::new("ns3:TPX")))?;
        write_event(writer, Event::End(BytesEnd::new("Extensions")))?;
    }

    write_event(writer, Event::End(BytesEnd::new("Trackpoint")))
}

fn write_event<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), ExportError> {
    writer
        .write_event(event)
        .map_err(|e| ExportError::XmlError(e.to_string()))
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: &str,
) -> Result<(), ExportError> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_event(writer, Event::Text(BytesText::new(value)))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

fn write_heart_rate_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    value: f64,
) -> Result<(), ExportError> {
    write_event(writer, Event::Start(BytesStart::new(name)))?;
    write_element(writer, "Value", &format!("{:.0}", value))?;
    write_event(writer, Event::End(BytesEnd::new(name)))
}

/// Export a record and write it to `path`.
pub fn export_tcx_to_file(record: &WorkoutRecord, path: &std::path::Path) -> Result<(), ExportError> {
    let content = export_tcx(record)?;
    std::fs::write(path, content)?;
    tracing::info!("Exported workout {} to {}", record.id, path.display());
    Ok(())
}

/// Default file name for a record export.
pub fn generate_tcx_filename(record: &WorkoutRecord) -> String {
    format!("spinlab_{}.tcx", record.start_time.format("%Y%m%d_%H%M%S"))
}
