//! Spinlab command line.
//!
//! Browses the workout catalog and training plans, runs simulated rides
//! through the execution engine and reports analytics over the stored
//! history.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use spinlab::measurements::{Channel, Measurement, SimulatedSensor};
use spinlab::metrics::analytics::{estimate_ftp, Period, TestProtocol};
use spinlab::metrics::{HRZones, PowerZones, ZoneDistribution};
use spinlab::recording::{export_tcx_to_file, generate_tcx_filename, RideSession};
use spinlab::storage::config::{self, AppConfig};
use spinlab::storage::{Database, PlanProgressTracker, UserSettings};
use spinlab::workouts::{
    all_plans, all_workouts, find_plan, find_workout, segment_targets, workouts_by_category,
    ExecutionController, WorkoutCategory, WorkoutEvent, WorkoutRunner,
};
use spinlab::{AnalyticsEngine, WorkoutRepository};

#[derive(Parser)]
#[command(name = "spinlab", version, about = "Structured cycling workouts and training analytics")]
struct Cli {
    /// Config file (defaults to the platform data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List catalog workouts
    Catalog {
        #[arg(long)]
        category: Option<WorkoutCategory>,
    },
    /// Show one workout with targets at the current FTP
    Workout { id: String },
    /// List training plans, or show one with progress
    Plans { id: Option<String> },
    /// Track progress through a training plan
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },
    /// Ride a catalog workout with simulated sensors
    Ride {
        workout_id: String,
        /// Milliseconds per workout second (overrides config)
        #[arg(long)]
        tick_ms: Option<u64>,
        /// Mark this ride as the plan workout for week/day
        #[arg(long, num_args = 3, value_names = ["PLAN", "WEEK", "DAY"])]
        plan: Option<Vec<String>>,
    },
    /// List completed rides, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the summary of one ride
    Summary { id: Uuid },
    /// Per-period training totals
    Trends {
        #[arg(long, default_value = "week")]
        period: Period,
        #[arg(long, default_value_t = 4)]
        count: usize,
    },
    /// Personal records
    Records,
    /// Time in zone across all rides
    Zones {
        /// Heart rate zones instead of power zones
        #[arg(long)]
        heartrate: bool,
    },
    /// Export a ride as TCX
    Export {
        id: Uuid,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show, set or estimate FTP
    Ftp {
        #[command(subcommand)]
        action: Option<FtpAction>,
    },
    /// Show the active configuration or write it to disk
    Config {
        #[arg(long)]
        write: bool,
    },
}

#[derive(Subcommand)]
enum PlanAction {
    Start { id: String },
    Done { id: String, week: u32, day: u8 },
    Status { id: String },
    Reset { id: String },
}

#[derive(Subcommand)]
enum FtpAction {
    Set { watts: u16 },
    /// Estimate from a 20-minute test average
    Estimate20 { average_watts: f64 },
    /// Estimate from a 5-minute test average
    Estimate5 { average_watts: f64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::get_config_path);
    let app_config = config::load_config_from(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&app_config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting Spinlab v{}", env!("CARGO_PKG_VERSION"));

    if let Command::Config { write } = cli.command {
        return show_config(&app_config, &config_path, write);
    }

    let mut db = Database::open(&app_config.database_path())
        .with_context(|| format!("opening {}", app_config.database_path().display()))?;

    match cli.command {
        Command::Catalog { category } => list_catalog(category),
        Command::Workout { id } => show_workout(&mut db, &app_config, &id),
        Command::Plans { id } => show_plans(&mut db, id.as_deref()),
        Command::Plan { action } => plan_action(&mut db, action),
        Command::Ride {
            workout_id,
            tick_ms,
            plan,
        } => ride(&mut db, &app_config, &workout_id, tick_ms, plan).await,
        Command::History { limit } => history(&db, limit),
        Command::Summary { id } => summary(&db, &id),
        Command::Trends { period, count } => trends(&mut db, &app_config, period, count),
        Command::Records => records(&mut db, &app_config),
        Command::Zones { heartrate } => zones(&mut db, &app_config, heartrate),
        Command::Export { id, output } => export(&db, &id, output),
        Command::Ftp { action } => ftp(&mut db, &app_config, action),
        Command::Config { .. } => Ok(()),
    }
}

fn show_config(app_config: &AppConfig, path: &PathBuf, write: bool) -> Result<()> {
    if write {
        config::save_config_to(app_config, path)?;
        println!("Wrote {}", path.display());
    }
    print!("{}", toml::to_string_pretty(app_config)?);
    println!("# database: {}", app_config.database_path().display());
    Ok(())
}

fn current_ftp(db: &mut Database, app_config: &AppConfig) -> Result<u16> {
    let training = &app_config.training;
    Ok(UserSettings::new(db, training.default_ftp, training.default_max_hr).ftp()?)
}

fn list_catalog(category: Option<WorkoutCategory>) -> Result<()> {
    let workouts = match category {
        Some(category) => workouts_by_category(category),
        None => all_workouts().iter().collect(),
    };

    for workout in workouts {
        println!(
            "{:<24} {:<12} {:>4} min  TSS {:>3.0}  IF {:.2}  {}",
            workout.id,
            workout.category.display_name(),
            workout.duration_minutes(),
            workout.training_stress_score,
            workout.intensity_factor,
            workout.name
        );
    }
    Ok(())
}

fn show_workout(db: &mut Database, app_config: &AppConfig, id: &str) -> Result<()> {
    let workout = find_workout(id)?;
    let ftp = current_ftp(db, app_config)?;

    println!("{} ({} min)", workout.name, workout.duration_minutes());
    println!("{}", workout.description);
    for plan in segment_targets(workout, ftp) {
        println!(
            "  {:>5}s  {:<20} {:>4}s  {}-{} W",
            plan.start_seconds, plan.name, plan.duration_seconds, plan.power.low, plan.power.high
        );
    }
    Ok(())
}

fn show_plans(db: &mut Database, id: Option<&str>) -> Result<()> {
    let Some(id) = id else {
        for plan in all_plans() {
            println!(
                "{:<16} {:<2} weeks  {:<14} {}",
                plan.id,
                plan.weeks_total,
                plan.goal.display_name(),
                plan.name
            );
        }
        return Ok(());
    };

    let plan = find_plan(id)?;
    let tracker = PlanProgressTracker::new(db);
    let progress = tracker.get_progress(id)?;

    println!("{}: {}", plan.name, plan.description);
    for week in &plan.weeks {
        println!("Week {} - {}", week.week_number, week.focus);
        for scheduled in &week.workouts {
            let done = progress
                .as_ref()
                .is_some_and(|p| p.is_completed(week.week_number, scheduled.day_of_week));
            let name = scheduled
                .workout()
                .map(|w| w.name.as_str())
                .unwrap_or(scheduled.workout_id.as_str());
            println!(
                "  [{}] day {}  {}",
                if done { "x" } else { " " },
                scheduled.day_of_week,
                name
            );
        }
    }
    Ok(())
}

fn plan_action(db: &mut Database, action: PlanAction) -> Result<()> {
    let mut tracker = PlanProgressTracker::new(db);
    match action {
        PlanAction::Start { id } => {
            tracker.start_plan(&id, Utc::now())?;
            println!("Started {}", id);
        }
        PlanAction::Done { id, week, day } => {
            let progress = tracker.mark_completed(&id, week, day, None, Utc::now())?;
            println!("Now on week {}", progress.current_week);
        }
        PlanAction::Status { id } => {
            let percent = tracker.completion_percent(&id)?;
            match tracker.get_progress(&id)? {
                Some(progress) => {
                    println!(
                        "{}: week {}, {:.0}% done",
                        id, progress.current_week, percent
                    );
                    if let Some((week, next)) = tracker.next_workout(&id)? {
                        println!("Next: week {} day {} {}", week, next.day_of_week, next.workout_id);
                    }
                }
                None => println!("{} not started", id),
            }
        }
        PlanAction::Reset { id } => {
            tracker.reset_plan(&id)?;
            println!("Reset {}", id);
        }
    }
    Ok(())
}

/// Deterministic rider model: holds the target midpoint with a little wobble.
fn simulated_power(target_mid: f64, second: u32) -> f64 {
    let wobble = ((second as f64) * 0.7).sin() * 0.04;
    (target_mid * (1.0 + wobble)).round()
}

async fn ride(
    db: &mut Database,
    app_config: &AppConfig,
    workout_id: &str,
    tick_ms: Option<u64>,
    plan: Option<Vec<String>>,
) -> Result<()> {
    let workout = find_workout(workout_id)?.clone();
    let ftp = current_ftp(db, app_config)?;
    let max_hr = app_config.training.default_max_hr as f64;

    let plan_slot = match plan.as_deref() {
        Some([plan_id, week, day]) => Some((
            plan_id.clone(),
            week.parse::<u32>().context("plan week")?,
            day.parse::<u8>().context("plan day")?,
        )),
        Some(_) => bail!("--plan takes PLAN WEEK DAY"),
        None => None,
    };

    let period = tick_ms
        .map(std::time::Duration::from_millis)
        .unwrap_or_else(|| app_config.execution.tick_interval());

    let start_time = Utc::now();
    let mut session = RideSession::start(db, Some(workout_id), start_time)?;

    let mut power_sensor = SimulatedSensor::new(Channel::Power);
    let mut hr_sensor = SimulatedSensor::new(Channel::Heartrate);
    let mut cadence_sensor = SimulatedSensor::new(Channel::Cadence);
    session.attach(&mut power_sensor);
    session.attach(&mut hr_sensor);
    session.attach(&mut cadence_sensor);

    let mut controller = ExecutionController::new(workout, ftp)?;
    let start_ms = start_time.timestamp_millis();
    controller.subscribe(move |event, snapshot| {
        // One sample set per workout second; Countdown shares its second
        if !matches!(
            event,
            WorkoutEvent::Tick | WorkoutEvent::SegmentChange | WorkoutEvent::Complete
        ) {
            return;
        }

        let second = snapshot.total_elapsed_seconds;
        let ts = start_ms + second as i64 * 1000;
        let power = simulated_power(snapshot.target_power.midpoint() as f64, second);
        let intensity = power / snapshot.ftp.max(1) as f64;
        let heartrate = (max_hr * (0.5 + 0.4 * intensity.min(1.2))).round();

        power_sensor.emit(Measurement::new(ts, power));
        hr_sensor.emit(Measurement::new(ts, heartrate));
        cadence_sensor.emit(Measurement::new(ts, 85.0 + (second % 7) as f64));
    });
    controller.subscribe(|event, snapshot| match event {
        WorkoutEvent::SegmentChange => tracing::info!(
            "Segment {}: {} ({}-{} W)",
            snapshot.segment_index + 1,
            snapshot.segment_name,
            snapshot.target_power.low,
            snapshot.target_power.high
        ),
        WorkoutEvent::Countdown => tracing::debug!(
            "{}s left in {}",
            snapshot.segment_remaining_seconds,
            snapshot.segment_name
        ),
        WorkoutEvent::Complete => tracing::info!("Workout complete"),
        _ => {}
    });

    let mut runner = WorkoutRunner::new(controller, period);
    runner.start();
    runner.wait().await;

    let elapsed = runner.with_controller(|c| c.total_elapsed_seconds());
    runner.destroy();

    let end_time = start_time + ChronoDuration::seconds(elapsed as i64);
    session.drain();
    if session.rejected() > 0 {
        tracing::warn!("{} samples dropped as out of range", session.rejected());
    }
    let record = session.finish(db, end_time)?;

    if let Some((plan_id, week, day)) = plan_slot {
        PlanProgressTracker::new(db).mark_completed(&plan_id, week, day, Some(record.id), end_time)?;
    }

    println!("Saved ride {}", record.id);
    print_summary(&record);
    Ok(())
}

fn print_summary(record: &spinlab::WorkoutRecord) {
    let summary = record.summary_or_compute();
    let fmt = |v: Option<f64>| v.map(|v| format!("{:.0}", v)).unwrap_or_else(|| "-".into());

    println!(
        "{}  {}  {} min",
        local(record.start_time).format("%Y-%m-%d %H:%M"),
        record.workout_id.as_deref().unwrap_or("free ride"),
        record.duration_seconds() / 60
    );
    println!(
        "  power avg {} max {} W | hr avg {} max {} | cadence avg {} max {} | {} samples",
        fmt(summary.avg_power),
        fmt(summary.max_power),
        fmt(summary.avg_heartrate),
        fmt(summary.max_heartrate),
        fmt(summary.avg_cadence),
        fmt(summary.max_cadence),
        summary.total_data_points
    );
}

fn local(instant: DateTime<Utc>) -> DateTime<Local> {
    instant.with_timezone(&Local)
}

fn history(db: &Database, limit: usize) -> Result<()> {
    let records = db.get_history(Some(limit))?;
    if records.is_empty() {
        println!("No completed rides yet");
    }
    for record in &records {
        println!("{}", record.id);
        print_summary(record);
    }
    Ok(())
}

fn summary(db: &Database, id: &Uuid) -> Result<()> {
    let record = db
        .get_record(id)?
        .with_context(|| format!("no ride {}", id))?;
    print_summary(&record);

    let power = record.measurements.power_values();
    let engine = AnalyticsEngine::new(db, 0);
    println!(
        "  NP {:.0} W | work {} kJ",
        engine.calculate_np(&power),
        engine.calculate_work(&power)
    );
    Ok(())
}

fn trends(db: &mut Database, app_config: &AppConfig, period: Period, count: usize) -> Result<()> {
    let ftp = current_ftp(db, app_config)?;
    let engine = AnalyticsEngine::new(&*db, ftp).with_week_start(app_config.training.week_start);

    for point in engine.calculate_trends(period, count)? {
        println!(
            "{}  {:>2} rides  {:>4} min  {:>5} kJ  avg {} W",
            local(point.start).format("%Y-%m-%d"),
            point.workout_count,
            point.total_duration_seconds / 60,
            point.total_work_kj,
            point
                .avg_power
                .map(|p| format!("{:.0}", p))
                .unwrap_or_else(|| "-".into())
        );
    }
    Ok(())
}

fn records(db: &mut Database, app_config: &AppConfig) -> Result<()> {
    let ftp = current_ftp(db, app_config)?;
    let engine = AnalyticsEngine::new(&*db, ftp);

    let records = engine.find_records()?;
    if records.is_empty() {
        println!("No records yet");
    }
    for record in records {
        println!(
            "{:<24} {:>5.0} W  {}  {}",
            record.kind.label(),
            record.value,
            local(record.achieved_at).format("%Y-%m-%d"),
            record.workout_id
        );
    }
    Ok(())
}

fn zones(db: &mut Database, app_config: &AppConfig, heartrate: bool) -> Result<()> {
    let training = &app_config.training;
    let (ftp, max_hr) = {
        let settings = UserSettings::new(db, training.default_ftp, training.default_max_hr);
        (settings.ftp()?, settings.max_hr()?)
    };
    let engine = AnalyticsEngine::new(&*db, ftp);

    let distribution = if heartrate {
        let bands = HRZones::from_max_hr(max_hr);
        for zone in &bands.ranges {
            println!("Z{} {:<12} {:>3}-{} bpm", zone.zone, zone.name, zone.min_bpm, upper(zone.max_bpm));
        }
        engine.aggregated_heartrate_zones(max_hr)?
    } else {
        let bands = PowerZones::from_ftp(ftp);
        for zone in &bands.ranges {
            println!("Z{} {:<14} {:>4}-{} W", zone.zone, zone.name, zone.min_watts, upper(zone.max_watts));
        }
        engine.aggregated_power_zones()?
    };

    print_distribution(&distribution);
    Ok(())
}

fn upper(bound: Option<u16>) -> String {
    bound.map(|b| b.to_string()).unwrap_or_else(|| "max".into())
}

fn print_distribution(distribution: &ZoneDistribution) {
    println!("Time in zone ({} min total)", distribution.total_ms / 60_000);
    for zone in &distribution.zones {
        println!(
            "  Z{} {:<14} {:>5.1}%  {:>4} min",
            zone.zone,
            zone.name,
            zone.percent,
            zone.duration_ms / 60_000
        );
    }
}

fn export(db: &Database, id: &Uuid, output: Option<PathBuf>) -> Result<()> {
    let record = db
        .get_record(id)?
        .with_context(|| format!("no ride {}", id))?;
    let path = output.unwrap_or_else(|| PathBuf::from(generate_tcx_filename(&record)));

    export_tcx_to_file(&record, &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn ftp(db: &mut Database, app_config: &AppConfig, action: Option<FtpAction>) -> Result<()> {
    let training = &app_config.training;
    let mut settings = UserSettings::new(db, training.default_ftp, training.default_max_hr);

    let estimate = match action {
        None => {
            println!("FTP {} W", settings.ftp()?);
            return Ok(());
        }
        Some(FtpAction::Set { watts }) => watts,
        Some(FtpAction::Estimate20 { average_watts }) => {
            estimate_ftp(TestProtocol::TwentyMinute, average_watts)
        }
        Some(FtpAction::Estimate5 { average_watts }) => {
            estimate_ftp(TestProtocol::FiveMinute, average_watts)
        }
    };

    settings.set_ftp(estimate)?;
    println!("FTP set to {} W", estimate);
    Ok(())
}
