//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use workout_core::model::{ProgressError, WeightRecordError};
use workout_core::plan_document::PlanDocumentError;

/// Errors emitted by `WorkoutStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// An uploaded plan document was rejected; the active plan is unchanged.
    #[error(transparent)]
    Validation(#[from] PlanDocumentError),
    /// A day or exercise index did not address the active plan.
    #[error(transparent)]
    Precondition(#[from] ProgressError),
    #[error(transparent)]
    Persistence(#[from] StorageError),
}

/// Errors emitted by `WeightService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WeightServiceError {
    #[error("sign in to track weights")]
    NotAuthenticated,
    #[error(transparent)]
    Record(#[from] WeightRecordError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by identity providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("invalid e-mail address: {0:?}")]
    InvalidEmail(String),
    #[error("display name must not be blank")]
    BlankName,
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
