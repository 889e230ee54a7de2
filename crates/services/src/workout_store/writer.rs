use std::sync::Arc;

use storage::repository::{
    PlanRepository, ProgressRepository, StorageError, TimerSnapshotRepository,
};
use tokio::sync::{broadcast, mpsc, oneshot};
use workout_core::model::{TimerSnapshot, UserId, WeekProgress, WorkoutWeek};

/// Outcome of a write-through, reported after the in-memory state already changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistEvent {
    Saved { owner: UserId, week: u32 },
    /// The write failed; in-memory progress is kept as is.
    Failed {
        owner: UserId,
        week: u32,
        error: String,
    },
    /// Nobody is signed in, so nothing was written.
    Skipped { week: u32 },
}

pub(crate) enum WriteJob {
    Progress {
        owner: UserId,
        progress: WeekProgress,
    },
    Plan {
        owner: UserId,
        plan: WorkoutWeek,
        progress: WeekProgress,
    },
    Timer(TimerSnapshot),
    ClearTimer,
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub(crate) struct WriteRepos {
    pub(crate) progress: Arc<dyn ProgressRepository>,
    pub(crate) plans: Arc<dyn PlanRepository>,
    pub(crate) timer: Arc<dyn TimerSnapshotRepository>,
}

/// Single background writer; jobs are applied in submission order.
#[derive(Clone)]
pub(crate) struct WriteQueue {
    tx: mpsc::UnboundedSender<WriteJob>,
}

impl WriteQueue {
    /// Spawns the writer task on the current tokio runtime.
    pub(crate) fn spawn(repos: WriteRepos, events: broadcast::Sender<PersistEvent>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(rx, repos, events));
        Self { tx }
    }

    pub(crate) fn push(&self, job: WriteJob) {
        if self.tx.send(job).is_err() {
            tracing::warn!("write queue closed; dropping job");
        }
    }

    /// Resolves once every job submitted before this call has been applied.
    pub(crate) async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.push(WriteJob::Flush(done));
        let _ = wait.await;
    }
}

async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<WriteJob>,
    repos: WriteRepos,
    events: broadcast::Sender<PersistEvent>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            WriteJob::Progress { owner, progress } => {
                let result = repos.progress.save_progress(owner, &progress).await;
                report(&events, owner, progress.week(), result);
            }
            WriteJob::Plan {
                owner,
                plan,
                progress,
            } => {
                let result = match repos.plans.save_active_plan(owner, &plan).await {
                    Ok(()) => repos.progress.save_progress(owner, &progress).await,
                    Err(err) => Err(err),
                };
                report(&events, owner, plan.week, result);
            }
            WriteJob::Timer(snapshot) => {
                if let Err(err) = repos.timer.save_timer(&snapshot).await {
                    tracing::warn!(error = %err, "failed to cache rest timer");
                }
            }
            WriteJob::ClearTimer => {
                if let Err(err) = repos.timer.clear_timer().await {
                    tracing::warn!(error = %err, "failed to clear rest timer cache");
                }
            }
            WriteJob::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("write queue drained");
}

fn report(
    events: &broadcast::Sender<PersistEvent>,
    owner: UserId,
    week: u32,
    result: Result<(), StorageError>,
) {
    let event = match result {
        Ok(()) => {
            tracing::debug!(user = %owner, week, "progress saved");
            PersistEvent::Saved { owner, week }
        }
        Err(err) => {
            tracing::warn!(user = %owner, week, error = %err, "failed to save progress");
            PersistEvent::Failed {
                owner,
                week,
                error: err.to_string(),
            }
        }
    };
    // No subscribers is fine.
    let _ = events.send(event);
}
