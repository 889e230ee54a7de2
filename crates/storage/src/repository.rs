use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use workout_core::model::{
    TimerSnapshot, UserId, WeekProgress, WeightEntry, WeightRecord, WeightRecordId, WorkoutWeek,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Per-user progress snapshots, keyed by `(user, week)`.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the saved progress for a user's week.
    ///
    /// Returns `Ok(None)` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn load_progress(
        &self,
        user: UserId,
        week: u32,
    ) -> Result<Option<WeekProgress>, StorageError>;

    /// Upsert the whole snapshot under `(user, progress.week())`.
    ///
    /// An existing snapshot is overwritten, never merged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_progress(&self, user: UserId, progress: &WeekProgress)
    -> Result<(), StorageError>;
}

/// The plan template each user trains from, replaced on upload.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn load_active_plan(&self, user: UserId) -> Result<Option<WorkoutWeek>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the plan cannot be stored.
    async fn save_active_plan(&self, user: UserId, plan: &WorkoutWeek) -> Result<(), StorageError>;
}

/// Logged lifts.
#[async_trait]
pub trait WeightRepository: Send + Sync {
    /// Insert a new record and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn insert_record(
        &self,
        user: UserId,
        entry: &WeightEntry,
        created_at: DateTime<Utc>,
    ) -> Result<WeightRecord, StorageError>;

    /// Replace the content of a record owned by `user`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no record with that id.
    async fn update_record(
        &self,
        user: UserId,
        id: WeightRecordId,
        entry: &WeightEntry,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user has no record with that id.
    async fn delete_record(&self, user: UserId, id: WeightRecordId) -> Result<(), StorageError>;

    /// All records of a user, newest date first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn list_records(&self, user: UserId) -> Result<Vec<WeightRecord>, StorageError>;
}

/// Device-local cache of the rest timer.
#[async_trait]
pub trait TimerSnapshotRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on connection or decoding failures.
    async fn load_timer(&self) -> Result<Option<TimerSnapshot>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_timer(&self, snapshot: &TimerSnapshot) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be removed.
    async fn clear_timer(&self) -> Result<(), StorageError>;
}

#[derive(Default)]
struct WeightTable {
    next_id: u64,
    rows: BTreeMap<WeightRecordId, WeightRecord>,
}

/// Simple in-memory repository implementation for testing and anonymous sessions.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<(UserId, u32), WeekProgress>>>,
    plans: Arc<Mutex<HashMap<UserId, WorkoutWeek>>>,
    weights: Arc<Mutex<WeightTable>>,
    timer: Arc<Mutex<Option<TimerSnapshot>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(
        &self,
        user: UserId,
        week: u32,
    ) -> Result<Option<WeekProgress>, StorageError> {
        let guard = self.progress.lock().map_err(poisoned)?;
        Ok(guard.get(&(user, week)).cloned())
    }

    async fn save_progress(
        &self,
        user: UserId,
        progress: &WeekProgress,
    ) -> Result<(), StorageError> {
        let mut guard = self.progress.lock().map_err(poisoned)?;
        guard.insert((user, progress.week()), progress.clone());
        Ok(())
    }
}

#[async_trait]
impl PlanRepository for InMemoryRepository {
    async fn load_active_plan(&self, user: UserId) -> Result<Option<WorkoutWeek>, StorageError> {
        let guard = self.plans.lock().map_err(poisoned)?;
        Ok(guard.get(&user).cloned())
    }

    async fn save_active_plan(&self, user: UserId, plan: &WorkoutWeek) -> Result<(), StorageError> {
        let mut guard = self.plans.lock().map_err(poisoned)?;
        guard.insert(user, plan.clone());
        Ok(())
    }
}

#[async_trait]
impl WeightRepository for InMemoryRepository {
    async fn insert_record(
        &self,
        user: UserId,
        entry: &WeightEntry,
        created_at: DateTime<Utc>,
    ) -> Result<WeightRecord, StorageError> {
        let mut guard = self.weights.lock().map_err(poisoned)?;
        guard.next_id += 1;
        let record = WeightRecord {
            id: WeightRecordId::new(guard.next_id),
            user_id: user,
            entry: entry.clone(),
            created_at,
        };
        guard.rows.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        user: UserId,
        id: WeightRecordId,
        entry: &WeightEntry,
    ) -> Result<(), StorageError> {
        let mut guard = self.weights.lock().map_err(poisoned)?;
        match guard.rows.get_mut(&id) {
            Some(record) if record.user_id == user => {
                record.entry = entry.clone();
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    async fn delete_record(&self, user: UserId, id: WeightRecordId) -> Result<(), StorageError> {
        let mut guard = self.weights.lock().map_err(poisoned)?;
        match guard.rows.get(&id) {
            Some(record) if record.user_id == user => {
                guard.rows.remove(&id);
                Ok(())
            }
            _ => Err(StorageError::NotFound),
        }
    }

    async fn list_records(&self, user: UserId) -> Result<Vec<WeightRecord>, StorageError> {
        let guard = self.weights.lock().map_err(poisoned)?;
        let mut records: Vec<WeightRecord> = guard
            .rows
            .values()
            .filter(|r| r.user_id == user)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.entry
                .date()
                .cmp(&a.entry.date())
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }
}

#[async_trait]
impl TimerSnapshotRepository for InMemoryRepository {
    async fn load_timer(&self) -> Result<Option<TimerSnapshot>, StorageError> {
        let guard = self.timer.lock().map_err(poisoned)?;
        Ok(*guard)
    }

    async fn save_timer(&self, snapshot: &TimerSnapshot) -> Result<(), StorageError> {
        let mut guard = self.timer.lock().map_err(poisoned)?;
        *guard = Some(*snapshot);
        Ok(())
    }

    async fn clear_timer(&self) -> Result<(), StorageError> {
        let mut guard = self.timer.lock().map_err(poisoned)?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub weights: Arc<dyn WeightRepository>,
    pub timer: Arc<dyn TimerSnapshotRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Wire every repository slot to the same backend.
    #[must_use]
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: ProgressRepository
            + PlanRepository
            + WeightRepository
            + TimerSnapshotRepository
            + Clone
            + 'static,
    {
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let plans: Arc<dyn PlanRepository> = Arc::new(repo.clone());
        let weights: Arc<dyn WeightRepository> = Arc::new(repo.clone());
        let timer: Arc<dyn TimerSnapshotRepository> = Arc::new(repo);
        Self {
            progress,
            plans,
            weights,
            timer,
        }
    }
}
