use std::time::Duration;

use workout_core::model::DEFAULT_REST_SECONDS;

/// Tunables for `WorkoutStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Rest countdown started after a set that leaves sets remaining.
    /// `None` disables the automatic timer.
    pub rest_after_set: Option<u32>,
    /// Repeat set completions for the same exercise inside this window are dropped.
    pub duplicate_window: Duration,
}

impl StoreConfig {
    #[must_use]
    pub fn with_rest_after_set(mut self, seconds: Option<u32>) -> Self {
        self.rest_after_set = seconds;
        self
    }

    #[must_use]
    pub fn with_duplicate_window(mut self, window: Duration) -> Self {
        self.duplicate_window = window;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            rest_after_set: Some(DEFAULT_REST_SECONDS),
            duplicate_window: Duration::from_millis(100),
        }
    }
}
