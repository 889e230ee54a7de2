use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

/// Drops repeat set completions for one exercise that arrive within `window`.
#[derive(Debug)]
pub(crate) struct CompletionGuard {
    window: Duration,
    last: HashMap<(usize, usize), Instant>,
}

impl CompletionGuard {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            last: HashMap::new(),
        }
    }

    /// Records an attempt for `key`. Returns false when it should be suppressed.
    ///
    /// Keys whose window has passed are pruned first.
    pub(crate) fn try_acquire(&mut self, key: (usize, usize), now: Instant) -> bool {
        let window = self.window;
        self.last
            .retain(|_, &mut seen| now.saturating_duration_since(seen) < window);
        if self.last.contains_key(&key) {
            return false;
        }
        self.last.insert(key, now);
        true
    }

    /// Forgets an attempt that never reached the progress state.
    pub(crate) fn release(&mut self, key: (usize, usize)) {
        self.last.remove(&key);
    }

    pub(crate) fn clear(&mut self) {
        self.last.clear();
    }
}
