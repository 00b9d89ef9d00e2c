//! Workout recording: persisted records, the repository interface, live
//! sessions and export.

pub mod exporter_tcx;
pub mod repository;
pub mod session;
pub mod types;

pub use exporter_tcx::{export_tcx, export_tcx_to_file, generate_tcx_filename};
pub use repository::{InMemoryRepository, RepositoryError, WorkoutRepository};
pub use session::{RideSession, SampleSender};
pub use types::{ExportError, RecordStatus, WorkoutRecord};
