//! Workout record persistence interface.

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use super::types::{RecordStatus, WorkoutRecord};
use crate::storage::DatabaseError;

/// Errors surfaced by a workout repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Workout record not found: {0}")]
    NotFound(Uuid),

    #[error("Repository unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// CRUD over stored workout records.
pub trait WorkoutRepository {
    /// Insert or replace a record by id.
    fn save(&mut self, record: &WorkoutRecord) -> Result<(), RepositoryError>;

    fn get(&self, id: &Uuid) -> Result<Option<WorkoutRecord>, RepositoryError>;

    /// The record currently being recorded, if any.
    fn get_active(&self) -> Result<Option<WorkoutRecord>, RepositoryError>;

    /// Completed records, newest first, at most `limit` of them.
    fn get_history(&self, limit: Option<usize>) -> Result<Vec<WorkoutRecord>, RepositoryError>;

    /// Remove a record. Fails with `NotFound` for an unknown id.
    fn delete(&mut self, id: &Uuid) -> Result<(), RepositoryError>;
}

/// Repository kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: HashMap<Uuid, WorkoutRecord>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl WorkoutRepository for InMemoryRepository {
    fn save(&mut self, record: &WorkoutRecord) -> Result<(), RepositoryError> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    fn get(&self, id: &Uuid) -> Result<Option<WorkoutRecord>, RepositoryError> {
        Ok(self.records.get(id).cloned())
    }

    fn get_active(&self) -> Result<Option<WorkoutRecord>, RepositoryError> {
        Ok(self
            .records
            .values()
            .filter(|r| r.status == RecordStatus::Active)
            .max_by_key(|r| r.start_time)
            .cloned())
    }

    fn get_history(&self, limit: Option<usize>) -> Result<Vec<WorkoutRecord>, RepositoryError> {
        let mut history: Vec<WorkoutRecord> = self
            .records
            .values()
            .filter(|r| r.status == RecordStatus::Completed)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        if let Some(limit) = limit {
            history.truncate(limit);
        }
        Ok(history)
    }

    fn delete(&mut self, id: &Uuid) -> Result<(), RepositoryError> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(*id))
    }
}
