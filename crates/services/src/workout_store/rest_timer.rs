use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use workout_core::model::{RestTimer, TimerSnapshot, TimerTick};

use super::writer::{WriteJob, WriteQueue};

const TICK: Duration = Duration::from_secs(1);

/// Shared handle to the rest countdown.
///
/// Every change is published to subscribers and cached through the write queue.
#[derive(Clone)]
pub struct RestTimerHandle {
    shared: Arc<TimerShared>,
}

struct TimerShared {
    state: Mutex<TimerState>,
    updates: watch::Sender<TimerSnapshot>,
    writes: WriteQueue,
}

struct TimerState {
    timer: RestTimer,
    // Bumped on every external transition; a ticker from an older epoch stops.
    epoch: u64,
    ticker: Option<JoinHandle<()>>,
}

impl TimerShared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        self.updates.send_replace(snapshot);
        self.writes.push(WriteJob::Timer(snapshot));
    }
}

impl RestTimerHandle {
    pub(crate) fn new(writes: WriteQueue) -> Self {
        let (updates, _) = watch::channel(TimerSnapshot::default());
        Self {
            shared: Arc::new(TimerShared {
                state: Mutex::new(TimerState {
                    timer: RestTimer::new(),
                    epoch: 0,
                    ticker: None,
                }),
                updates,
                writes,
            }),
        }
    }

    /// Starts counting down from `seconds`, replacing any running countdown.
    pub fn start(&self, seconds: u32) {
        tracing::debug!(seconds, "rest timer started");
        self.transition(|timer| timer.start(seconds));
    }

    /// Stops the countdown and keeps the remaining time.
    pub fn pause(&self) {
        self.transition(RestTimer::pause);
    }

    /// Stops the countdown and clears the remaining time.
    pub fn reset(&self) {
        self.transition(RestTimer::reset);
    }

    /// Resumes from a cached snapshot; an active one keeps counting down.
    pub fn restore(&self, snapshot: TimerSnapshot) {
        self.transition(|timer| *timer = RestTimer::from_snapshot(snapshot));
    }

    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.lock().timer.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.updates.subscribe()
    }

    fn transition(&self, apply: impl FnOnce(&mut RestTimer)) {
        let snapshot = {
            let mut state = self.shared.lock();
            if let Some(ticker) = state.ticker.take() {
                ticker.abort();
            }
            state.epoch += 1;
            apply(&mut state.timer);
            if state.timer.is_active() {
                state.ticker = Some(spawn_ticker(Arc::downgrade(&self.shared), state.epoch));
            }
            state.timer.snapshot()
        };
        self.shared.publish(snapshot);
    }
}

fn spawn_ticker(shared: Weak<TimerShared>, epoch: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = time::interval_at(Instant::now() + TICK, TICK);
        loop {
            ticks.tick().await;
            let Some(strong) = shared.upgrade() else {
                break;
            };
            let (tick, snapshot) = {
                let mut state = strong.lock();
                if state.epoch != epoch {
                    break;
                }
                let tick = state.timer.tick();
                (tick, state.timer.snapshot())
            };
            match tick {
                TimerTick::Running(_) => strong.publish(snapshot),
                TimerTick::Expired => {
                    tracing::info!("rest finished");
                    strong.publish(snapshot);
                    break;
                }
                TimerTick::Idle => break,
            }
        }
    })
}
