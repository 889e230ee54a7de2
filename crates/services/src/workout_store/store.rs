use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use storage::repository::{
    PlanRepository, ProgressRepository, Storage, StorageError, TimerSnapshotRepository,
};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use workout_core::model::{ProgressSummary, SetAdvance, UserId, WeekProgress, WorkoutWeek};
use workout_core::plan_document::{export_plan_document, parse_plan_document, plan_file_name};

use super::config::StoreConfig;
use super::guard::CompletionGuard;
use super::rest_timer::RestTimerHandle;
use super::writer::{PersistEvent, WriteJob, WriteQueue, WriteRepos};
use crate::error::StoreError;
use crate::identity::Identity;

const EVENT_CAPACITY: usize = 64;

/// Result of `WorkoutStore::complete_one_set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Advanced {
        current_set: u32,
        sets: u32,
        exercise_completed: bool,
        day_completed: bool,
    },
    /// Every set was already done; nothing changed.
    AlreadyComplete,
    /// A repeat of the previous completion arrived inside the guard window.
    Suppressed,
}

/// Owns the week's progress for the current identity.
///
/// Mutations apply to memory synchronously and are then written through a
/// single ordered queue. Write outcomes are broadcast as `PersistEvent`s; a
/// failed write never rolls back the in-memory state.
pub struct WorkoutStore {
    state: Mutex<StoreState>,
    guard: Mutex<CompletionGuard>,
    timer: RestTimerHandle,
    writes: WriteQueue,
    events: broadcast::Sender<PersistEvent>,
    plans: Arc<dyn PlanRepository>,
    saved_progress: Arc<dyn ProgressRepository>,
    saved_timer: Arc<dyn TimerSnapshotRepository>,
    default_plan: WorkoutWeek,
    config: StoreConfig,
}

struct StoreState {
    owner: Option<Identity>,
    // False until the owner's saved progress has been loaded.
    writable: bool,
    progress: WeekProgress,
    generation: u64,
}

impl StoreState {
    fn write_target(&self) -> Option<UserId> {
        match &self.owner {
            Some(identity) if self.writable => Some(identity.user_id),
            _ => None,
        }
    }
}

impl WorkoutStore {
    /// Builds an anonymous store showing `default_plan` and spawns its writer.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn new(storage: &Storage, default_plan: WorkoutWeek, config: StoreConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let writes = WriteQueue::spawn(
            WriteRepos {
                progress: Arc::clone(&storage.progress),
                plans: Arc::clone(&storage.plans),
                timer: Arc::clone(&storage.timer),
            },
            events.clone(),
        );
        let timer = RestTimerHandle::new(writes.clone());

        Arc::new(Self {
            state: Mutex::new(StoreState {
                owner: None,
                writable: false,
                progress: WeekProgress::zeroed(&default_plan),
                generation: 0,
            }),
            guard: Mutex::new(CompletionGuard::new(config.duplicate_window)),
            timer,
            writes,
            events,
            plans: Arc::clone(&storage.plans),
            saved_progress: Arc::clone(&storage.progress),
            saved_timer: Arc::clone(&storage.timer),
            default_plan,
            config,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_guard(&self) -> MutexGuard<'_, CompletionGuard> {
        self.guard.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    #[must_use]
    pub fn timer(&self) -> &RestTimerHandle {
        &self.timer
    }

    #[must_use]
    pub fn owner(&self) -> Option<Identity> {
        self.lock_state().owner.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> WeekProgress {
        self.lock_state().progress.clone()
    }

    #[must_use]
    pub fn progress(&self) -> ProgressSummary {
        self.lock_state().progress.summary()
    }

    #[must_use]
    pub fn persist_events(&self) -> broadcast::Receiver<PersistEvent> {
        self.events.subscribe()
    }

    /// Resumes the rest countdown cached by a previous run.
    pub async fn restore_timer(&self) {
        match self.saved_timer.load_timer().await {
            Ok(Some(snapshot)) => {
                tracing::debug!(?snapshot, "restoring rest timer");
                self.timer.restore(snapshot);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "could not restore rest timer"),
        }
    }

    /// Makes `identity` the owner and loads its saved progress.
    ///
    /// Progress resets to the zeroed default plan first. Leaving a signed-in
    /// owner for nobody or for a different user also resets the rest timer
    /// and clears its cached snapshot. A load that finishes after a newer
    /// switch started is discarded.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persistence` when saved progress cannot be read.
    /// The store then keeps the zeroed default plan and skips writes until a
    /// later switch succeeds, so stored progress is never overwritten.
    pub async fn switch_identity(&self, identity: Option<Identity>) -> Result<(), StoreError> {
        let (generation, previous) = {
            let mut state = self.lock_state();
            state.generation += 1;
            let previous = std::mem::replace(&mut state.owner, identity.clone());
            state.writable = false;
            state.progress = WeekProgress::zeroed(&self.default_plan);
            (state.generation, previous.map(|owner| owner.user_id))
        };
        self.lock_guard().clear();

        // The timer belongs to whoever started it.
        if previous.is_some() && previous != identity.as_ref().map(|next| next.user_id) {
            self.timer.reset();
            self.writes.push(WriteJob::ClearTimer);
        }

        let Some(identity) = identity else {
            tracing::info!("no identity; showing default plan");
            return Ok(());
        };

        // Writes queued for any owner land before saved progress is read.
        self.writes.flush().await;

        let user = identity.user_id;
        let (progress, fresh) = match self.load_for(user).await {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!(%user, error = %err, "could not load saved progress");
                return Err(err.into());
            }
        };

        {
            let mut state = self.lock_state();
            if state.generation != generation {
                tracing::debug!(%user, "discarding stale progress load");
                return Ok(());
            }
            state.progress = progress.clone();
            state.writable = true;
        }
        tracing::info!(%user, week = progress.week(), "progress loaded");

        if fresh {
            self.writes.push(WriteJob::Progress {
                owner: user,
                progress,
            });
        }
        Ok(())
    }

    async fn load_for(&self, user: UserId) -> Result<(WeekProgress, bool), StorageError> {
        let template = self
            .plans
            .load_active_plan(user)
            .await?
            .unwrap_or_else(|| self.default_plan.clone());
        let saved = self.saved_progress.load_progress(user, template.week).await?;
        let fresh = saved.is_none();
        Ok((WeekProgress::reconcile(&template, saved.as_ref()), fresh))
    }

    /// Follows identity changes until the sender is dropped.
    pub fn watch_identity(
        self: &Arc<Self>,
        mut identities: watch::Receiver<Option<Identity>>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let identity = identities.borrow_and_update().clone();
                let current = store.owner().map(|owner| owner.user_id);
                if current != identity.as_ref().map(|i| i.user_id) {
                    if let Err(err) = store.switch_identity(identity).await {
                        tracing::warn!(error = %err, "identity switch left store read-only");
                    }
                }
                if identities.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Replaces the active plan and discards all progress.
    ///
    /// Supersedes a progress load still in flight for the same owner.
    pub fn replace_plan(&self, plan: WorkoutWeek) {
        let progress = WeekProgress::zeroed(&plan);
        let target = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.writable = state.owner.is_some();
            state.progress = progress.clone();
            state.write_target()
        };
        self.lock_guard().clear();
        tracing::info!(week = plan.week, days = plan.days.len(), "plan replaced");

        match target {
            Some(owner) => self.writes.push(WriteJob::Plan {
                owner,
                plan,
                progress,
            }),
            None => self.skip(plan.week),
        }
    }

    /// Validates a plan document and makes it the active plan.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` when the document is rejected; the
    /// active plan and progress are unchanged.
    pub fn import_plan(&self, document: &str) -> Result<WorkoutWeek, StoreError> {
        let plan = parse_plan_document(document)?;
        self.replace_plan(plan.clone());
        Ok(plan)
    }

    /// Serializes the active plan without progress.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` if encoding fails.
    pub fn export_plan(&self) -> Result<String, StoreError> {
        let plan = self.lock_state().progress.to_plan();
        Ok(export_plan_document(&plan)?)
    }

    #[must_use]
    pub fn export_file_name(&self) -> String {
        plan_file_name(self.lock_state().progress.week())
    }

    /// Flips an exercise's completed flag and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Precondition` for indices outside the active plan.
    pub fn toggle_exercise_completion(
        &self,
        day: usize,
        exercise: usize,
    ) -> Result<bool, StoreError> {
        let (completed, target, progress) = {
            let mut state = self.lock_state();
            let completed = state.progress.toggle_exercise(day, exercise)?;
            (completed, state.write_target(), state.progress.clone())
        };
        self.write_progress(target, progress);
        Ok(completed)
    }

    /// Records one finished set and starts the rest timer when sets remain.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Precondition` for indices outside the active plan.
    pub fn complete_one_set(&self, day: usize, exercise: usize) -> Result<SetOutcome, StoreError> {
        let key = (day, exercise);
        if !self.lock_guard().try_acquire(key, Instant::now()) {
            tracing::debug!(day, exercise, "duplicate set completion suppressed");
            return Ok(SetOutcome::Suppressed);
        }

        let applied = {
            let mut state = self.lock_state();
            let result = state.progress.complete_set(day, exercise);
            result.map(|advance| (advance, state.write_target(), state.progress.clone()))
        };
        let (advance, target, progress) = match applied {
            Ok(applied) => applied,
            Err(err) => {
                self.lock_guard().release(key);
                return Err(err.into());
            }
        };

        match advance {
            SetAdvance::AlreadyComplete => Ok(SetOutcome::AlreadyComplete),
            SetAdvance::Advanced {
                current_set,
                sets,
                exercise_completed,
                day_completed,
            } => {
                self.write_progress(target, progress);
                if advance.has_sets_remaining() {
                    if let Some(seconds) = self.config.rest_after_set {
                        self.timer.start(seconds);
                    }
                }
                Ok(SetOutcome::Advanced {
                    current_set,
                    sets,
                    exercise_completed,
                    day_completed,
                })
            }
        }
    }

    /// Zeroes all progress for the active plan and stops the rest timer.
    pub fn reset_progress(&self) {
        let (target, progress) = {
            let mut state = self.lock_state();
            state.progress.reset();
            (state.write_target(), state.progress.clone())
        };
        self.lock_guard().clear();
        self.timer.reset();
        self.writes.push(WriteJob::ClearTimer);
        tracing::info!(week = progress.week(), "progress reset");
        self.write_progress(target, progress);
    }

    /// Writes the current progress immediately and waits for the result.
    ///
    /// Returns `Ok(false)` when nobody is signed in.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Persistence` if the write fails.
    pub async fn save_now(&self) -> Result<bool, StoreError> {
        self.flush().await;
        let (target, progress) = {
            let state = self.lock_state();
            (state.write_target(), state.progress.clone())
        };
        let Some(owner) = target else {
            return Ok(false);
        };
        self.saved_progress.save_progress(owner, &progress).await?;
        tracing::info!(user = %owner, week = progress.week(), "progress saved manually");
        Ok(true)
    }

    /// Waits until every write queued so far has been applied.
    pub async fn flush(&self) {
        self.writes.flush().await;
    }

    fn write_progress(&self, target: Option<UserId>, progress: WeekProgress) {
        match target {
            Some(owner) => self.writes.push(WriteJob::Progress { owner, progress }),
            None => self.skip(progress.week()),
        }
    }

    fn skip(&self, week: u32) {
        tracing::debug!(week, "not signed in; change kept in memory");
        let _ = self.events.send(PersistEvent::Skipped { week });
    }
}
