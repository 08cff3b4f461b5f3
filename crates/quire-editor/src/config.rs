//! Editor configuration.

use std::time::Duration;

/// Tuning knobs for one open editor.
#[derive(Clone, Debug)]
pub struct AutosaveConfig {
    /// Quiet period a debounce key must see before its pending write is
    /// sent. Every schedule call on a key restarts this interval.
    pub quiet_interval: Duration,
    /// Capacity of the editor event broadcast channel. Slow subscribers
    /// that fall further behind than this lose oldest events.
    pub event_capacity: usize,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            // The observed convention for "the user stopped typing".
            quiet_interval: Duration::from_millis(500),
            event_capacity: 64,
        }
    }
}

impl AutosaveConfig {
    /// Override the quiet interval.
    pub fn with_quiet_interval(mut self, quiet: Duration) -> Self {
        self.quiet_interval = quiet;
        self
    }
}
