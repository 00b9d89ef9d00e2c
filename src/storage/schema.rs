//! Database schema definitions.

/// SQL schema for creating all database tables.
pub const SCHEMA: &str = r#"
-- Workout records table
CREATE TABLE IF NOT EXISTS workout_records (
    id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    workout_id TEXT,
    start_time TEXT NOT NULL,
    end_time TEXT,
    summary_json TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_workout_records_status ON workout_records(status);
CREATE INDEX IF NOT EXISTS idx_workout_records_start_time ON workout_records(start_time);

-- Measurement samples table
CREATE TABLE IF NOT EXISTS measurements (
    record_id TEXT NOT NULL REFERENCES workout_records(id) ON DELETE CASCADE,
    channel TEXT NOT NULL,
    seq INTEGER NOT NULL,
    timestamp INTEGER NOT NULL,
    value REAL NOT NULL,
    PRIMARY KEY (record_id, channel, seq)
);

-- Key-value settings table
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

/// Schema version table for migrations.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 1;
