use serde::{Deserialize, Serialize};

/// Rest period started after a non-final set unless configured otherwise.
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Serializable view of the rest timer, cached so a countdown survives a restart.
///
/// Advisory only; never a source of truth for workout progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub active: bool,
    pub remaining_seconds: u32,
}

/// What a single one-second tick did to the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Still running with this many seconds left.
    Running(u32),
    /// Reached zero on this tick and went idle.
    Expired,
    /// Not running; the tick was ignored.
    Idle,
}

/// Two-state rest countdown: idle or running.
///
/// Pausing keeps the remaining time so the countdown can be resumed with
/// `start(remaining)`; resetting clears it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestTimer {
    active: bool,
    remaining_seconds: u32,
}

impl RestTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a timer from a cached snapshot. An active snapshot with no
    /// time left is treated as expired.
    #[must_use]
    pub fn from_snapshot(snapshot: TimerSnapshot) -> Self {
        Self {
            active: snapshot.active && snapshot.remaining_seconds > 0,
            remaining_seconds: snapshot.remaining_seconds,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            active: self.active,
            remaining_seconds: self.remaining_seconds,
        }
    }

    /// Starts counting down from `seconds`. Zero expires immediately.
    pub fn start(&mut self, seconds: u32) {
        self.remaining_seconds = seconds;
        self.active = seconds > 0;
    }

    /// Stops the countdown, keeping the remaining time.
    pub fn pause(&mut self) {
        self.active = false;
    }

    /// Stops the countdown and clears the remaining time.
    pub fn reset(&mut self) {
        self.active = false;
        self.remaining_seconds = 0;
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TimerTick {
        if !self.active {
            return TimerTick::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.active = false;
            TimerTick::Expired
        } else {
            TimerTick::Running(self.remaining_seconds)
        }
    }
}

/// Formats seconds as `MM:SS`.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
