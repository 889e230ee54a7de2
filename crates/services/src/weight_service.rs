use std::sync::Arc;

use storage::repository::WeightRepository;
use workout_core::model::{
    UserId, WeightProgress, WeightRecord, WeightRecordDraft, WeightRecordId, recent_records,
    summarize_weights,
};

use crate::Clock;
use crate::error::WeightServiceError;
use crate::identity::IdentityProvider;

/// Number of records shown by default in an exercise's history.
pub const DEFAULT_RECENT_LIMIT: usize = 3;

/// Weight records of the signed-in user and their per-exercise progress.
#[derive(Clone)]
pub struct WeightService {
    clock: Clock,
    records: Arc<dyn WeightRepository>,
    identity: Arc<dyn IdentityProvider>,
}

impl WeightService {
    #[must_use]
    pub fn new(
        clock: Clock,
        records: Arc<dyn WeightRepository>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            clock,
            records,
            identity,
        }
    }

    fn owner(&self) -> Result<UserId, WeightServiceError> {
        self.identity
            .current()
            .map(|identity| identity.user_id)
            .ok_or(WeightServiceError::NotAuthenticated)
    }

    /// Validate and store a new record.
    ///
    /// # Errors
    ///
    /// Returns `WeightServiceError::NotAuthenticated` when nobody is signed in.
    /// Returns `WeightServiceError::Record` for validation failures.
    /// Returns `WeightServiceError::Storage` if persistence fails.
    pub async fn add_record(
        &self,
        draft: WeightRecordDraft,
    ) -> Result<WeightRecord, WeightServiceError> {
        let owner = self.owner()?;
        let entry = draft.validate()?;
        let record = self
            .records
            .insert_record(owner, &entry, self.clock.now())
            .await?;
        tracing::info!(
            id = %record.id,
            exercise = record.entry.exercise_name(),
            weight = record.entry.weight(),
            "weight recorded"
        );
        Ok(record)
    }

    /// Replace the fields of one of the user's records.
    ///
    /// # Errors
    ///
    /// Returns `WeightServiceError::Storage` with `StorageError::NotFound`
    /// when the record does not exist or belongs to someone else.
    pub async fn update_record(
        &self,
        id: WeightRecordId,
        draft: WeightRecordDraft,
    ) -> Result<(), WeightServiceError> {
        let owner = self.owner()?;
        let entry = draft.validate()?;
        self.records.update_record(owner, id, &entry).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `WeightServiceError::Storage` with `StorageError::NotFound`
    /// when the record does not exist or belongs to someone else.
    pub async fn delete_record(&self, id: WeightRecordId) -> Result<(), WeightServiceError> {
        let owner = self.owner()?;
        self.records.delete_record(owner, id).await?;
        tracing::info!(%id, "weight record deleted");
        Ok(())
    }

    /// All of the user's records, newest first.
    ///
    /// # Errors
    ///
    /// Returns `WeightServiceError::NotAuthenticated` when nobody is signed in.
    pub async fn records(&self) -> Result<Vec<WeightRecord>, WeightServiceError> {
        let owner = self.owner()?;
        Ok(self.records.list_records(owner).await?)
    }

    /// Per-exercise progress, ordered by exercise name.
    ///
    /// # Errors
    ///
    /// Returns `WeightServiceError::NotAuthenticated` when nobody is signed in.
    pub async fn progress(&self) -> Result<Vec<WeightProgress>, WeightServiceError> {
        let records = self.records().await?;
        Ok(summarize_weights(&records))
    }

    /// # Errors
    ///
    /// Returns `WeightServiceError::NotAuthenticated` when nobody is signed in.
    pub async fn exercise_progress(
        &self,
        exercise_name: &str,
    ) -> Result<Option<WeightProgress>, WeightServiceError> {
        let progress = self.progress().await?;
        Ok(progress
            .into_iter()
            .find(|p| p.exercise_name == exercise_name))
    }

    /// Up to `limit` records for one exercise, newest first.
    ///
    /// # Errors
    ///
    /// Returns `WeightServiceError::NotAuthenticated` when nobody is signed in.
    pub async fn recent_records(
        &self,
        exercise_name: &str,
        limit: usize,
    ) -> Result<Vec<WeightRecord>, WeightServiceError> {
        let records = self.records().await?;
        Ok(recent_records(&records, exercise_name, limit)
            .into_iter()
            .cloned()
            .collect())
    }
}
