#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod identity;
pub mod weight_service;
pub mod workout_store;

pub use workout_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, IdentityError, StoreError, WeightServiceError};
pub use identity::{Identity, IdentityProvider, LocalIdentityProvider};
pub use weight_service::{DEFAULT_RECENT_LIMIT, WeightService};
pub use workout_store::{PersistEvent, RestTimerHandle, SetOutcome, StoreConfig, WorkoutStore};
