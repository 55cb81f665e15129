//! Exponential backoff between fetch attempts.

use std::time::Duration;

use rand::Rng;

use super::config::SchedulerConfig;

/// Backoff state for one tick's retries.
#[derive(Debug, Clone)]
pub struct Backoff {
    current_ms: u64,
    multiplier: f64,
    max_ms: u64,
}

impl Backoff {
    #[must_use]
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            current_ms: config.initial_backoff_ms.min(config.max_backoff_ms),
            multiplier: config.backoff_multiplier,
            max_ms: config.max_backoff_ms,
        }
    }

    /// Current delay plus jitter; advances the delay for the next call.
    pub fn next_delay(&mut self) -> Duration {
        let base = self.current_ms;
        let delay = base + jitter_ms(base);

        let next = (self.current_ms as f64 * self.multiplier) as u64;
        self.current_ms = next.min(self.max_ms);

        Duration::from_millis(delay)
    }
}

/// Up to 20% of the base delay.
fn jitter_ms(base_ms: u64) -> u64 {
    let range = base_ms / 5;
    if range == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=range)
}
