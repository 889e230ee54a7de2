use std::sync::Arc;

use storage::repository::Storage;
use tokio::task::JoinHandle;
use workout_core::default_plan;

use crate::Clock;
use crate::error::AppServicesError;
use crate::identity::{Identity, IdentityProvider, LocalIdentityProvider};
use crate::weight_service::WeightService;
use crate::workout_store::{StoreConfig, WorkoutStore};

/// Assembles the workout store, identity, and weight services over one storage.
pub struct AppServices {
    identity: Arc<LocalIdentityProvider>,
    store: Arc<WorkoutStore>,
    weights: Arc<WeightService>,
    identity_watch: JoinHandle<()>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        config: StoreConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, clock, config).await)
    }

    /// Build services over the given storage, restoring any cached rest timer.
    pub async fn with_storage(storage: &Storage, clock: Clock, config: StoreConfig) -> Self {
        let identity = Arc::new(LocalIdentityProvider::new());
        let store = WorkoutStore::new(storage, default_plan(), config);
        store.restore_timer().await;
        let identity_watch = store.watch_identity(identity.subscribe());

        let provider: Arc<dyn IdentityProvider> = identity.clone();
        let weights = Arc::new(WeightService::new(
            clock,
            Arc::clone(&storage.weights),
            provider,
        ));

        Self {
            identity,
            store,
            weights,
            identity_watch,
        }
    }

    /// Sign in and wait until the user's saved progress is loaded.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Identity` for a malformed e-mail and
    /// `AppServicesError::Store` when saved progress cannot be read.
    pub async fn sign_in(&self, email: &str) -> Result<Identity, AppServicesError> {
        let identity = self.identity.sign_in(email).await?;
        self.store.switch_identity(Some(identity.clone())).await?;
        Ok(identity)
    }

    pub async fn sign_out(&self) {
        self.identity.sign_out().await;
        // Infallible without an identity.
        let _ = self.store.switch_identity(None).await;
    }

    #[must_use]
    pub fn identity(&self) -> Arc<LocalIdentityProvider> {
        Arc::clone(&self.identity)
    }

    #[must_use]
    pub fn store(&self) -> Arc<WorkoutStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn weights(&self) -> Arc<WeightService> {
        Arc::clone(&self.weights)
    }

    /// Stop following identity changes and wait for pending writes.
    pub async fn shutdown(self) {
        self.identity_watch.abort();
        self.store.flush().await;
    }
}
