//! Per-route polling state.
//!
//! Each route moves `Idle → Fetching → {Recorded, FetchFailed}`; the two
//! outcome states are idle states that remember how the last tick ended.
//! `Removed` is terminal.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::domain::{Price, RecordOutcome, RouteConfig, RouteId};
use crate::error::FetchError;

/// Where a route is in its polling cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteState {
    Idle,
    Fetching,
    Recorded,
    FetchFailed,
    Removed,
}

impl std::fmt::Display for RouteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Recorded => "recorded",
            Self::FetchFailed => "failed",
            Self::Removed => "removed",
        };
        f.write_str(label)
    }
}

/// Why a tick produced no stored price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleFailure {
    /// An airport rule could not be expanded.
    Resolve(String),
    /// Every fetch attempt failed; holds the last error.
    Fetch(FetchError),
    /// The fetched observation was invalid.
    Rejected(String),
    /// The observation could not be persisted.
    Storage(String),
}

impl std::fmt::Display for CycleFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolve(reason) => write!(f, "airport resolution failed: {reason}"),
            Self::Fetch(err) => write!(f, "{err}"),
            Self::Rejected(reason) => write!(f, "observation rejected: {reason}"),
            Self::Storage(reason) => write!(f, "storage error: {reason}"),
        }
    }
}

/// Result of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A price was stored.
    Recorded(RecordOutcome),
    /// A price was fetched but the same-day policy kept the stored one.
    Unchanged,
    /// No price this tick.
    Failed(CycleFailure),
    /// A previous tick for the route was still running.
    Skipped,
    /// The route was removed while the tick ran; nothing was stored.
    Removed,
}

/// Point-in-time view of a route for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStatus {
    pub route_id: RouteId,
    pub route_name: String,
    pub state: RouteState,
    pub ticks: u64,
    pub skipped_ticks: u64,
    pub consecutive_failures: u32,
    pub degraded: bool,
    pub storage_degraded: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub last_price: Option<Price>,
    pub last_error: Option<String>,
}

impl RouteStatus {
    fn new(route: &RouteConfig) -> Self {
        Self {
            route_id: route.id().clone(),
            route_name: route.name().to_string(),
            state: RouteState::Idle,
            ticks: 0,
            skipped_ticks: 0,
            consecutive_failures: 0,
            degraded: false,
            storage_degraded: false,
            last_success: None,
            last_price: None,
            last_error: None,
        }
    }
}

/// Scheduler bookkeeping for one watched route.
pub(crate) struct RouteSlot {
    id: RouteId,
    route: RwLock<RouteConfig>,
    in_flight: AtomicBool,
    removed: AtomicBool,
    pub(crate) status: Mutex<RouteStatus>,
    driver: Mutex<Option<JoinHandle<()>>>,
    ticks: Mutex<Vec<JoinHandle<()>>>,
}

impl RouteSlot {
    pub(crate) fn new(route: RouteConfig) -> Self {
        let status = RouteStatus::new(&route);
        Self::with_status(route, status)
    }

    fn with_status(route: RouteConfig, status: RouteStatus) -> Self {
        Self {
            id: route.id().clone(),
            route: RwLock::new(route),
            in_flight: AtomicBool::new(false),
            removed: AtomicBool::new(false),
            status: Mutex::new(status),
            driver: Mutex::new(None),
            ticks: Mutex::new(Vec::new()),
        }
    }

    /// Fresh slot for a stopped route that keeps its counters.
    pub(crate) fn revive(&self) -> Self {
        let mut status = self.status.lock().clone();
        status.state = RouteState::Idle;
        Self::with_status(self.route(), status)
    }

    pub(crate) const fn id(&self) -> &RouteId {
        &self.id
    }

    /// Parameters the next tick will fetch with.
    pub(crate) fn route(&self) -> RouteConfig {
        self.route.read().clone()
    }

    /// Adopt parameters saved since the last tick. Returns whether they
    /// differed.
    pub(crate) fn refresh(&self, stored: RouteConfig) -> bool {
        let mut route = self.route.write();
        if *route == stored {
            return false;
        }
        self.status.lock().route_name = stored.name().to_string();
        *route = stored;
        true
    }

    /// Claim the route for one tick, or `None` if a tick is running.
    pub(crate) fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight { slot: self })
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    /// Install the interval task unless one is already running.
    ///
    /// `spawn` is only called when the slot needs a driver.
    pub(crate) fn ensure_driver(&self, spawn: impl FnOnce() -> JoinHandle<()>) {
        let mut driver = self.driver.lock();
        if self.is_removed() || driver.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }
        *driver = Some(spawn());
    }

    /// Keep a spawned tick so that removal can abort it.
    pub(crate) fn track_tick(&self, task: JoinHandle<()>) {
        let mut ticks = self.ticks.lock();
        ticks.retain(|task| !task.is_finished());
        ticks.push(task);
    }

    /// Abort the interval task and any spawned ticks.
    pub(crate) fn halt(&self) {
        if let Some(driver) = self.driver.lock().take() {
            driver.abort();
        }
        for task in self.ticks.lock().drain(..) {
            task.abort();
        }
    }

    /// Mark the slot removed and stop its tasks.
    pub(crate) fn remove(&self) {
        self.removed.store(true, Ordering::Release);
        self.halt();
        self.mark_removed();
    }

    pub(crate) fn mark_removed(&self) {
        self.status.lock().state = RouteState::Removed;
    }
}

/// Releases the in-flight flag on drop, including when a tick is aborted.
pub(crate) struct InFlight<'a> {
    slot: &'a RouteSlot,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.slot.in_flight.store(false, Ordering::Release);
    }
}
