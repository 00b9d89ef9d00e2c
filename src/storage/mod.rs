//! Storage module for database, configuration and rider settings.

pub mod config;
pub mod database;
pub mod schema;
pub mod settings;

pub use config::{AppConfig, ConfigError, ExecutionSettings, TrainingSettings};
pub use database::{Database, DatabaseError};
pub use settings::{
    CompletedWorkout, InMemorySettings, PlanProgress, PlanProgressTracker, PowerZoneView,
    SettingsError, SettingsStore, UserSettings, ZonePreferences, MAX_FTP, MIN_FTP,
};
