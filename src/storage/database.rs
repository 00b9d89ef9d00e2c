//! Database operations using rusqlite.

use crate::measurements::{Channel, Measurement, Measurements};
use crate::metrics::analytics::WorkoutSummary;
use crate::recording::repository::{RepositoryError, WorkoutRepository};
use crate::recording::types::{RecordStatus, WorkoutRecord};
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use crate::storage::settings::{SettingsError, SettingsStore};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

const RECORD_COLUMNS: &str =
    "id, status, workout_id, start_time, end_time, summary_json, created_at, updated_at";

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Workout record operations ==========

    /// Insert or replace a workout record together with its measurements.
    pub fn save_record(&mut self, record: &WorkoutRecord) -> Result<(), DatabaseError> {
        let summary_json = record
            .summary
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tx.execute(
            "INSERT INTO workout_records (id, status, workout_id, start_time, end_time,
             summary_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                workout_id = excluded.workout_id,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                summary_json = excluded.summary_json,
                updated_at = excluded.updated_at",
            params![
                record.id.to_string(),
                record.status.as_str(),
                record.workout_id,
                record.start_time.to_rfc3339(),
                record.end_time.map(|dt| dt.to_rfc3339()),
                summary_json,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tx.execute(
            "DELETE FROM measurements WHERE record_id = ?1",
            params![record.id.to_string()],
        )
        .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO measurements (record_id, channel, seq, timestamp, value)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            for channel in Channel::all() {
                for (seq, sample) in record.measurements.channel(channel).iter().enumerate() {
                    stmt.execute(params![
                        record.id.to_string(),
                        channel.as_str(),
                        seq as i64,
                        sample.timestamp,
                        sample.value,
                    ])
                    .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
                }
            }
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tracing::debug!(
            "Saved workout record {} ({}, {} samples)",
            record.id,
            record.status.as_str(),
            record.measurements.total_len()
        );

        Ok(())
    }

    /// Get a workout record by ID, measurements included.
    pub fn get_record(&self, id: &Uuid) -> Result<Option<WorkoutRecord>, DatabaseError> {
        let sql = format!("SELECT {} FROM workout_records WHERE id = ?1", RECORD_COLUMNS);
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], RecordRow::from_row)
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(|row| self.load_record(row)).transpose()
    }

    /// The most recently started record still marked active.
    pub fn get_active_record(&self) -> Result<Option<WorkoutRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM workout_records WHERE status = ?1 ORDER BY start_time DESC LIMIT 1",
            RECORD_COLUMNS
        );
        let row = self
            .conn
            .query_row(
                &sql,
                params![RecordStatus::Active.as_str()],
                RecordRow::from_row,
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        row.map(|row| self.load_record(row)).transpose()
    }

    /// Completed records ordered by start time descending.
    pub fn list_completed_records(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<WorkoutRecord>, DatabaseError> {
        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let sql = format!(
            "SELECT {} FROM workout_records WHERE status = ?1
             ORDER BY start_time DESC LIMIT ?2",
            RECORD_COLUMNS
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![RecordStatus::Completed.as_str(), limit],
                RecordRow::from_row,
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            records.push(self.load_record(row)?);
        }

        Ok(records)
    }

    /// Delete a workout record by ID (cascades to measurements).
    pub fn delete_record(&self, id: &Uuid) -> Result<(), DatabaseError> {
        let rows_affected = self
            .conn
            .execute(
                "DELETE FROM workout_records WHERE id = ?1",
                params![id.to_string()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if rows_affected == 0 {
            return Err(DatabaseError::NotFound(format!("Workout record {}", id)));
        }

        Ok(())
    }

    /// Count stored records of any status.
    pub fn count_records(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM workout_records", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }

    fn get_measurements(&self, record_id: &str) -> Result<Measurements, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT channel, timestamp, value FROM measurements
                 WHERE record_id = ?1 ORDER BY channel, seq",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(params![record_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut measurements = Measurements::default();
        for row in rows {
            let (channel, timestamp, value) =
                row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            let channel: Channel = channel
                .parse()
                .map_err(|e| DatabaseError::DeserializationError(format!("{}", e)))?;
            let sample = Measurement::new(timestamp, value);
            match channel {
                Channel::Power => measurements.power.push(sample),
                Channel::Heartrate => measurements.heartrate.push(sample),
                Channel::Cadence => measurements.cadence.push(sample),
            }
        }

        Ok(measurements)
    }

    fn load_record(&self, row: RecordRow) -> Result<WorkoutRecord, DatabaseError> {
        let measurements = self.get_measurements(&row.id)?;
        row.into_record(measurements)
    }

    // ========== Settings operations ==========

    /// Read a raw settings value.
    pub fn get_setting(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))
    }

    /// Insert or overwrite a raw settings value.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    pub fn remove_setting(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }
}

impl WorkoutRepository for Database {
    fn save(&mut self, record: &WorkoutRecord) -> Result<(), RepositoryError> {
        Ok(self.save_record(record)?)
    }

    fn get(&self, id: &Uuid) -> Result<Option<WorkoutRecord>, RepositoryError> {
        Ok(self.get_record(id)?)
    }

    fn get_active(&self) -> Result<Option<WorkoutRecord>, RepositoryError> {
        Ok(self.get_active_record()?)
    }

    fn get_history(&self, limit: Option<usize>) -> Result<Vec<WorkoutRecord>, RepositoryError> {
        Ok(self.list_completed_records(limit)?)
    }

    fn delete(&mut self, id: &Uuid) -> Result<(), RepositoryError> {
        match self.delete_record(id) {
            Err(DatabaseError::NotFound(_)) => Err(RepositoryError::NotFound(*id)),
            other => Ok(other?),
        }
    }
}

impl SettingsStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.get_setting(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SettingsError> {
        Ok(self.set_setting(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), SettingsError> {
        Ok(self.remove_setting(key)?)
    }
}

/// Intermediate struct for reading workout record rows from database.
struct RecordRow {
    id: String,
    status: String,
    workout_id: Option<String>,
    start_time: String,
    end_time: Option<String>,
    summary_json: Option<String>,
    created_at: String,
    updated_at: String,
}

impl RecordRow {
    fn from_row(row: &rusqlite::Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            id: row.get(0)?,
            status: row.get(1)?,
            workout_id: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            summary_json: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    fn into_record(self, measurements: Measurements) -> Result<WorkoutRecord, DatabaseError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid UUID: {}", e)))?;

        let status: RecordStatus = self
            .status
            .parse()
            .map_err(DatabaseError::DeserializationError)?;

        let summary = self
            .summary_json
            .map(|json| serde_json::from_str::<WorkoutSummary>(&json))
            .transpose()
            .map_err(|e| DatabaseError::DeserializationError(format!("Invalid summary: {}", e)))?;

        let end_time = self.end_time.as_deref().map(parse_timestamp).transpose()?;

        Ok(WorkoutRecord {
            id,
            status,
            workout_id: self.workout_id,
            start_time: parse_timestamp(&self.start_time)?,
            end_time,
            measurements,
            summary,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::DeserializationError(format!("Invalid timestamp: {}", e)))
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
