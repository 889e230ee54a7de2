//! Persistence for workout progress, plans, weight records, and the timer cache.

#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, PlanRepository, ProgressRepository, Storage, StorageError,
    TimerSnapshotRepository, WeightRepository,
};
pub use sqlite::{SqliteInitError, SqliteRepository};
