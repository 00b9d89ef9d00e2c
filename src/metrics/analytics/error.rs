//! Analytics error types.

use thiserror::Error;

use crate::recording::repository::RepositoryError;

/// Errors that can occur during analytics calculations.
///
/// Every calculation is total over its input, so the only failure source is
/// the repository the history is read from. Its errors pass through as-is.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Reading workout history failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
