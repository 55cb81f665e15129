//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::application::scheduler::SchedulerConfig;

/// Scheduler config that retries without sleeping.
///
/// One-second fetch timeout and a one-hour interval; tests either call
/// `tick` directly or run on paused tokio time.
pub fn scheduler() -> SchedulerConfig {
    SchedulerConfig {
        interval_secs: 3600,
        fetch_timeout_secs: 1,
        max_attempts: 3,
        initial_backoff_ms: 0,
        backoff_multiplier: 1.0,
        max_backoff_ms: 0,
        degraded_after: 3,
    }
}
