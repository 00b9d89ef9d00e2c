//! Live ride session: sensor samples in, workout record out.
//!
//! Sensors deliver samples on their own threads, so they push into a
//! crossbeam channel through a [`SampleSender`]. The session drains the
//! channel into its [`MeasurementStore`] on the owner's thread.

use chrono::{DateTime, Utc};
use crossbeam::channel::{Receiver, Sender};

use super::repository::{RepositoryError, WorkoutRepository};
use super::types::WorkoutRecord;
use crate::measurements::{
    Channel, Measurement, MeasurementStore, SampleListener, SensorConnection,
};

/// Cloneable handle that forwards samples into a session.
#[derive(Debug, Clone)]
pub struct SampleSender {
    tx: Sender<(Channel, Measurement)>,
}

impl SampleSender {
    /// Queue a sample. Returns false once the session is gone.
    pub fn send(&self, channel: Channel, sample: Measurement) -> bool {
        self.tx.send((channel, sample)).is_ok()
    }

    /// Listener suitable for [`SensorConnection::add_listener`].
    pub fn listener(&self, channel: Channel) -> SampleListener {
        let tx = self.tx.clone();
        Box::new(move |sample| {
            let _ = tx.send((channel, sample));
        })
    }
}

/// One ride being recorded.
pub struct RideSession {
    record: WorkoutRecord,
    store: MeasurementStore,
    tx: Sender<(Channel, Measurement)>,
    rx: Receiver<(Channel, Measurement)>,
    rejected: usize,
}

impl RideSession {
    /// Open a new active record and persist it.
    pub fn start<R: WorkoutRepository + ?Sized>(
        repository: &mut R,
        workout_id: Option<&str>,
        start_time: DateTime<Utc>,
    ) -> Result<Self, RepositoryError> {
        let mut record = WorkoutRecord::new(start_time);
        record.workout_id = workout_id.map(str::to_string);
        repository.save(&record)?;

        tracing::info!(
            "Ride session started: {} ({})",
            record.id,
            workout_id.unwrap_or("free ride")
        );

        let (tx, rx) = crossbeam::channel::unbounded();
        Ok(Self {
            record,
            store: MeasurementStore::new(),
            tx,
            rx,
            rejected: 0,
        })
    }

    pub fn sender(&self) -> SampleSender {
        SampleSender {
            tx: self.tx.clone(),
        }
    }

    /// Subscribe to a sensor's samples.
    pub fn attach(&self, sensor: &mut dyn SensorConnection) {
        let channel = sensor.channel();
        sensor.add_listener(self.sender().listener(channel));
        tracing::debug!(%channel, "Sensor attached to session {}", self.record.id);
    }

    /// Move queued samples into the store. Returns how many were kept.
    pub fn drain(&mut self) -> usize {
        let mut kept = 0;
        for (channel, sample) in self.rx.try_iter() {
            if self.store.add_to(channel, sample) {
                kept += 1;
            } else {
                self.rejected += 1;
            }
        }
        kept
    }

    pub fn record(&self) -> &WorkoutRecord {
        &self.record
    }

    pub fn measurements(&self) -> &MeasurementStore {
        &self.store
    }

    /// Samples dropped as out of range so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Save the in-progress record with the samples received so far.
    pub fn checkpoint<R: WorkoutRepository + ?Sized>(
        &mut self,
        repository: &mut R,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.drain();
        self.record.measurements = self.store.snapshot();
        self.record.updated_at = now;
        repository.save(&self.record)?;
        tracing::debug!(
            "Checkpointed session {} with {} samples",
            self.record.id,
            self.store.len()
        );
        Ok(())
    }

    /// Complete the record, compute its summary and save it.
    pub fn finish<R: WorkoutRepository + ?Sized>(
        mut self,
        repository: &mut R,
        end_time: DateTime<Utc>,
    ) -> Result<WorkoutRecord, RepositoryError> {
        self.drain();
        self.record.complete(self.store.snapshot(), end_time);
        repository.save(&self.record)?;

        tracing::info!(
            "Ride session completed: {} ({}s, {} samples, {} rejected)",
            self.record.id,
            self.record.duration_seconds(),
            self.store.len(),
            self.rejected
        );
        Ok(self.record)
    }

    /// Mark the record discarded and save it.
    pub fn discard<R: WorkoutRepository + ?Sized>(
        mut self,
        repository: &mut R,
        end_time: DateTime<Utc>,
    ) -> Result<WorkoutRecord, RepositoryError> {
        self.drain();
        self.record.measurements = self.store.snapshot();
        self.record.discard(end_time);
        repository.save(&self.record)?;

        tracing::info!("Ride session discarded: {}", self.record.id);
        Ok(self.record)
    }
}
